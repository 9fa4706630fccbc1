// ==========================================
// IMP 批次导入服务 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum IngestError {
    // ===== 文件相关错误 =====
    #[error("文件读取失败 ({path}): {message}")]
    FileRead { path: String, message: String },

    #[error("文件编码错误 ({path}): 期望 UTF-8, {message}")]
    Encoding { path: String, message: String },

    // ===== 落盘错误 =====
    #[error("落盘失败 (操作 {op}, 路径 {path}): {message}")]
    Persistence {
        op: &'static str,
        path: String,
        message: String,
    },
}

/// Result 类型别名
pub type IngestResult<T> = Result<T, IngestError>;
