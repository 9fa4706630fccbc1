// ==========================================
// IMP 批次导入服务 - 领域模型层
// ==========================================
// 职责: 定义批次、运行号、快照等领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod batch;
pub mod batch_log;
pub mod snapshot;
pub mod types;

// 重导出核心类型
pub use batch::{
    BatchLine, BatchOutcome, BatchReport, RunRecord, RunTally, SplitStep, StageOpStatus,
    StageReport, TransformedBatch,
};
pub use batch_log::BatchLogEntry;
pub use snapshot::{Snapshot, SnapshotEntry, NO_DATA_MESSAGE, SNAPSHOT_CAPACITY};
pub use types::{DivisionFactor, FactorSource, RunKey};
