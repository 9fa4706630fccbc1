// ==========================================
// IMP 批次导入服务 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供批次日志的数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod batch_log_repo;
pub mod error;

// 重导出核心仓储
pub use batch_log_repo::BatchLogRepository;
pub use error::{RepositoryError, RepositoryResult};
