// ==========================================
// IMP 批次导入服务 - 核心库
// ==========================================
// 技术栈: tokio + notify + SQLite
// 系统定位: 批次文件接收 → 运行号派生与拆分 → 快照推送
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 批次日志
pub mod repository;

// 引擎层 - 运行号拆分
pub mod engine;

// 导入层 - 批次流水线
pub mod importer;

// 配置层 - 服务配置与设置
pub mod config;

// 快照层 - 轮询与推送
pub mod snapshot;

// 监听层 - 目录监听与事件分发
pub mod watcher;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调用接口
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BatchOutcome, BatchReport, DivisionFactor, FactorSource, RunKey, Snapshot, SnapshotEntry,
};

// 引擎
pub use engine::RunBalancer;

// API
pub use api::{BatchApi, SettingsApi, SnapshotApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "IMP 批次导入服务";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
