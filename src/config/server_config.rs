// ==========================================
// IMP 批次导入服务 - 服务配置
// ==========================================
// 职责: 目录布局、监听参数、定时参数
// 解析顺序: 环境变量 → 用户数据目录 → 当前目录
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 环境变量：服务根目录
pub const ENV_BASE_DIR: &str = "IMP_SERVER_BASE_DIR";

/// 环境变量：批次日志数据库路径
pub const ENV_DB_PATH: &str = "IMP_SERVER_DB_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    // ===== 目录 =====
    pub inbox_dir: PathBuf,   // 待处理目录 (SOURCE)
    pub cache_dir: PathBuf,   // 缓存目录 (TEMP)
    pub archive_dir: PathBuf, // 归档目录 (SAV)

    // ===== 设置文件 =====
    pub settings_file: PathBuf,      // 除数
    pub skip_patterns_file: PathBuf, // 跳过模式

    // ===== 批次日志 =====
    pub db_path: PathBuf,

    // ===== 监听 =====
    pub extension: String,          // 识别的扩展名（不含点）
    pub canonical_filename: String, // 驱动快照的缓存文件名

    // ===== 定时 =====
    pub settle_delay_ms: u64, // 到达后等待写入稳定
    pub grace_delay_ms: u64,  // 处理完成后保留在途标记

    // ===== 队列 =====
    pub event_queue_capacity: usize,
    pub push_channel_capacity: usize,
}

impl ServerConfig {
    /// 以指定根目录构造默认布局
    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            inbox_dir: base.join("SOURCE"),
            cache_dir: base.join("TEMP"),
            archive_dir: base.join("SAV"),
            settings_file: base.join("settings.txt"),
            skip_patterns_file: base.join("filesettings.txt"),
            db_path: base.join("imp_server.db"),
            extension: "imp".to_string(),
            canonical_filename: "Dimter.imp".to_string(),
            settle_delay_ms: 100,
            grace_delay_ms: 500,
            event_queue_capacity: 256,
            push_channel_capacity: 16,
        }
    }

    /// 从环境变量解析配置
    ///
    /// - IMP_SERVER_BASE_DIR: 根目录（优先）
    /// - 否则: 用户数据目录/imp-server（Debug 构建为 imp-server-dev）
    /// - 都不可用: 当前目录
    /// - IMP_SERVER_DB_PATH: 单独覆盖批次日志数据库路径
    pub fn from_env() -> Self {
        let mut config = Self::with_base_dir(default_base_dir());

        if let Ok(path) = std::env::var(ENV_DB_PATH) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                config.db_path = PathBuf::from(trimmed);
            }
        }

        config
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.cache_dir.join(&self.canonical_filename)
    }

    /// 创建所需目录
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.inbox_dir, &self.cache_dir, &self.archive_dir] {
            std::fs::create_dir_all(dir)?;
        }
        if let Some(parent) = self.skip_patterns_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// 默认根目录
pub fn default_base_dir() -> PathBuf {
    if let Ok(path) = std::env::var(ENV_BASE_DIR) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => {
            #[cfg(debug_assertions)]
            {
                data_dir.join("imp-server-dev")
            }

            #[cfg(not(debug_assertions))]
            {
                data_dir.join("imp-server")
            }
        }
        None => PathBuf::from("."),
    }
}
