// ==========================================
// IMP 批次导入服务 - 配置层
// ==========================================
// 职责: 服务目录配置 + 可热加载的设置（除数 / 跳过模式）
// 存储: 纯文本设置文件
// ==========================================

pub mod config_store;
pub mod server_config;
pub mod settings_reader_trait;

// 重导出核心配置类型
pub use config_store::{ConfigStore, SkipPatternReload};
pub use server_config::ServerConfig;
pub use settings_reader_trait::SettingsReader;
