// ==========================================
// IMP 批次导入服务 - 导入层
// ==========================================
// 职责: 批次文件的跳过判断、运行号派生、落盘
// 流程: 读取 → 跳过判断 → 派生 → 拆分 → 落盘
// ==========================================

// 模块声明
pub mod batch_processor_trait;
pub mod error;
pub mod pipeline;
pub mod skip_filter;
pub mod stage_writer;
pub mod transformer;

// 重导出核心类型
pub use batch_processor_trait::BatchProcessor;
pub use error::{IngestError, IngestResult};
pub use pipeline::{describe_runs, BatchPipeline};
pub use skip_filter::match_skip_pattern;
pub use stage_writer::StageWriter;
pub use transformer::RecordTransformer;
