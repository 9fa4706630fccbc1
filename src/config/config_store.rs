// ==========================================
// IMP 批次导入服务 - 设置存储
// ==========================================
// 职责: 除数（标量，按批次重读）与跳过模式（列表，变更时重载）
// 存储: settings.txt（正整数） / filesettings.txt（每行一个子串）
// ==========================================

use crate::config::settings_reader_trait::SettingsReader;
use crate::domain::types::{DivisionFactor, FactorSource, DEFAULT_SKIP_PATTERN};
use crate::importer::transformer::parse_leading_int;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// 跳过模式重载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipPatternReload {
    /// 已安装新列表
    Installed(usize),
    /// 新内容为空，保留原列表
    KeptEmpty,
    /// 读取失败，保留原列表
    KeptUnreadable(String),
}

// ==========================================
// ConfigStore - 设置存储
// ==========================================
pub struct ConfigStore {
    settings_path: PathBuf,
    skip_patterns_path: PathBuf,
    skip_patterns: RwLock<Arc<Vec<String>>>,
}

impl ConfigStore {
    /// 创建设置存储（跳过模式初始为默认值，需调用 reload_skip_patterns 加载）
    pub fn new(settings_path: impl Into<PathBuf>, skip_patterns_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            skip_patterns_path: skip_patterns_path.into(),
            skip_patterns: RwLock::new(Arc::new(vec![DEFAULT_SKIP_PATTERN.to_string()])),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn skip_patterns_path(&self) -> &Path {
        &self.skip_patterns_path
    }

    // ===== 除数 =====

    /// 从设置文件读取除数
    pub async fn read_division_factor(&self) -> DivisionFactor {
        let content = match tokio::fs::read_to_string(&self.settings_path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %self.settings_path.display(),
                    error = %e,
                    "无法读取除数设置，使用默认值 4"
                );
                return DivisionFactor::default_with(FactorSource::DefaultMissing);
            }
        };

        match parse_division_factor(&content) {
            Some(value) => {
                tracing::info!(division_factor = value, "使用设置文件中的除数");
                DivisionFactor::from_settings(value)
            }
            None => {
                tracing::warn!(raw_value = %content.trim(), "除数设置非法，使用默认值 4");
                DivisionFactor::default_with(FactorSource::DefaultInvalid)
            }
        }
    }

    /// 写入除数（调用方负责校验）
    pub async fn write_division_factor(&self, value: u32) -> std::io::Result<()> {
        tokio::fs::write(&self.settings_path, value.to_string()).await?;
        tracing::info!(division_factor = value, "除数设置已保存");
        Ok(())
    }

    // ===== 跳过模式 =====

    /// 当前生效的跳过模式
    pub fn skip_patterns(&self) -> Arc<Vec<String>> {
        match self.skip_patterns.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 重新加载跳过模式
    ///
    /// 读取失败或解析结果为空时保留原列表（永不安装空列表）。
    pub async fn reload_skip_patterns(&self) -> SkipPatternReload {
        let content = match tokio::fs::read_to_string(&self.skip_patterns_path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %self.skip_patterns_path.display(),
                    error = %e,
                    active = ?self.skip_patterns(),
                    "无法读取跳过模式设置，保留当前列表"
                );
                return SkipPatternReload::KeptUnreadable(e.to_string());
            }
        };

        let patterns = parse_skip_patterns(&content);
        if patterns.is_empty() {
            tracing::warn!(active = ?self.skip_patterns(), "跳过模式设置为空，保留当前列表");
            return SkipPatternReload::KeptEmpty;
        }

        let count = patterns.len();
        tracing::info!(patterns = ?patterns, "已加载跳过模式");
        let next = Arc::new(patterns);
        match self.skip_patterns.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        SkipPatternReload::Installed(count)
    }
}

#[async_trait]
impl SettingsReader for ConfigStore {
    async fn get_division_factor(&self) -> DivisionFactor {
        self.read_division_factor().await
    }

    async fn get_skip_patterns(&self) -> Arc<Vec<String>> {
        self.skip_patterns()
    }
}

// ==========================================
// 解析辅助
// ==========================================

/// 解析除数：取去空白后的前导整数，必须为正且不超过 u32
///
/// "6abc" → 6，"8.0" → 8；"abc"、"0"、"-3" → None
pub fn parse_division_factor(raw: &str) -> Option<u32> {
    parse_leading_int(raw.trim())
        .filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
}

/// 解析跳过模式：按行切分，去空白，丢弃空行
pub fn parse_skip_patterns(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
