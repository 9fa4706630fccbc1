// ==========================================
// IMP 批次导入服务 - 快照层
// ==========================================
// 职责: 解析规范缓存文件，持有当前快照，轮询与推送
// 红线: 解析失败不覆盖已持有的快照
// ==========================================

pub mod error;
pub mod parser;
pub mod publisher;

pub use error::{SnapshotError, SnapshotResult};
pub use parser::parse_snapshot;
pub use publisher::{SnapshotErrorEvent, SnapshotEvent, SnapshotPublisher, SnapshotSubscription};
