// ==========================================
// IMP 批次导入服务 - 监听错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("目录监听初始化失败: {0}")]
    Notify(#[from] notify::Error),

    #[error("监听目录不可用 ({path}): {message}")]
    Directory { path: String, message: String },
}

pub type WatchResult<T> = Result<T, WatchError>;
