// ==========================================
// IMP 批次导入服务 - 快照错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("快照文件读取失败 ({path}): {message}")]
    Read { path: String, message: String },

    #[error("快照文件解析失败 ({path}): {message}")]
    Parse { path: String, message: String },

    #[error("快照状态锁获取失败: {0}")]
    LockPoisoned(String),
}

impl SnapshotError {
    /// 推送给订阅者的错误文本
    pub fn public_message(&self, filename: &str) -> String {
        match self {
            SnapshotError::Read { .. } => format!("Error reading {} file", filename),
            SnapshotError::Parse { .. } => "Error processing file data".to_string(),
            SnapshotError::LockPoisoned(_) => "Internal snapshot error".to_string(),
        }
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
