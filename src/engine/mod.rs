// ==========================================
// IMP 批次导入服务 - 引擎层
// ==========================================
// 职责: 运行号产能拆分规则，纯函数，不做 IO
// 红线: 单个运行号成员数 ≤ 999，记录顺序不变
// ==========================================

pub mod run_balancer;

// 重导出核心引擎
pub use run_balancer::{BalanceOutcome, RunBalancer};
