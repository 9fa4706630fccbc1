// ==========================================
// IMP 批次导入服务 - 应用层
// ==========================================
// 职责: 组件装配与服务启动
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
