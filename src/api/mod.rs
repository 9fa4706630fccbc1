// ==========================================
// IMP 批次导入服务 - API 层
// ==========================================
// 职责: 提供设置、快照、批次日志的调用接口，供外部传输层调用
// ==========================================

pub mod batch_api;
pub mod error;
pub mod settings_api;
pub mod snapshot_api;

// 重导出核心类型
pub use batch_api::BatchApi;
pub use error::{ApiError, ApiResult};
pub use settings_api::{DivisionFactorView, SettingsApi};
pub use snapshot_api::SnapshotApi;
