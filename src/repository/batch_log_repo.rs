// ==========================================
// IMP 批次导入服务 - 批次日志数据仓储
// ==========================================
// 职责: batch_log 表的写入与查询
// 约束: 日志写入失败不影响批次结果
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use self::core::BatchLogRepository;
