// ==========================================
// IMP 批次导入服务 - 监听事件分类
// ==========================================
// 职责: 将原始文件系统事件归类为业务事件
// 输入: RawFsEvent（路径 + 新增/删除）
// 输出: WatchEvent（到达 / 删除 / 规范文件变更 / 设置变更 / 其他）
// ==========================================

use crate::config::ServerConfig;
use std::path::{Path, PathBuf};

/// 原始变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsChange {
    /// 创建、改名进入或内容写入
    Upserted,
    /// 删除或改名移出
    Removed,
}

/// 原始文件系统事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFsEvent {
    pub path: PathBuf,
    pub change: FsChange,
}

impl RawFsEvent {
    pub fn upserted(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            change: FsChange::Upserted,
        }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            change: FsChange::Removed,
        }
    }
}

/// 被监听的目录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchLocation {
    Inbox,
    Cache,
    Archive,
}

impl WatchLocation {
    pub fn as_str(&self) -> &str {
        match self {
            WatchLocation::Inbox => "SOURCE",
            WatchLocation::Cache => "TEMP",
            WatchLocation::Archive => "SAV",
        }
    }
}

/// 分类后的业务事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// 待处理目录中出现批次文件
    Arrival { filename: String },
    /// 文件被删除（只记录日志）
    Removed {
        location: WatchLocation,
        filename: String,
    },
    /// 缓存或归档目录中出现/更新了非规范文件
    Created {
        location: WatchLocation,
        filename: String,
    },
    /// 规范缓存文件创建、变更或删除
    CanonicalChanged,
    /// 跳过模式设置文件变更
    SkipPatternsChanged,
    /// 与业务无关的事件
    Ignored,
}

struct WatchedDir {
    location: WatchLocation,
    paths: Vec<PathBuf>,
}

// ==========================================
// EventRouter - 事件分类器
// ==========================================
pub struct EventRouter {
    dirs: Vec<WatchedDir>,
    skip_patterns_file: PathBuf,
    extension: String,
    canonical_filename: String,
}

impl EventRouter {
    pub fn new(config: &ServerConfig) -> Self {
        let dirs = [
            (WatchLocation::Inbox, &config.inbox_dir),
            (WatchLocation::Cache, &config.cache_dir),
            (WatchLocation::Archive, &config.archive_dir),
        ]
        .into_iter()
        .map(|(location, dir)| WatchedDir {
            location,
            paths: path_forms(dir),
        })
        .collect();

        Self {
            dirs,
            skip_patterns_file: config.skip_patterns_file.clone(),
            extension: config.extension.clone(),
            canonical_filename: config.canonical_filename.clone(),
        }
    }

    /// 事件分类
    pub fn classify(&self, event: &RawFsEvent) -> WatchEvent {
        let Some(filename) = event.path.file_name().and_then(|n| n.to_str()) else {
            return WatchEvent::Ignored;
        };

        if self.is_skip_patterns_file(&event.path) {
            return WatchEvent::SkipPatternsChanged;
        }

        if !self.has_extension(&event.path) {
            return WatchEvent::Ignored;
        }

        let Some(location) = self.location_of(&event.path) else {
            return WatchEvent::Ignored;
        };

        let filename = filename.to_string();
        match (event.change, location) {
            // 规范文件的删除同样触发重新加载（结果为无数据标记）
            (_, WatchLocation::Cache) if filename == self.canonical_filename => {
                WatchEvent::CanonicalChanged
            }
            (FsChange::Removed, location) => WatchEvent::Removed { location, filename },
            (FsChange::Upserted, WatchLocation::Inbox) => WatchEvent::Arrival { filename },
            (FsChange::Upserted, location) => WatchEvent::Created { location, filename },
        }
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e == self.extension)
            .unwrap_or(false)
    }

    fn location_of(&self, path: &Path) -> Option<WatchLocation> {
        let parent = path.parent()?;
        let forms = path_forms(parent);
        self.dirs
            .iter()
            .find(|dir| dir.paths.iter().any(|p| forms.contains(p)))
            .map(|dir| dir.location)
    }

    fn is_skip_patterns_file(&self, path: &Path) -> bool {
        if path == self.skip_patterns_file {
            return true;
        }
        // 目录可能以不同形式出现（符号链接、相对路径）
        match (path.parent(), self.skip_patterns_file.parent(), path.file_name()) {
            (Some(parent), Some(expected), Some(name)) => {
                Some(name) == self.skip_patterns_file.file_name()
                    && path_forms(parent)
                        .iter()
                        .any(|p| path_forms(expected).contains(p))
            }
            _ => false,
        }
    }
}

/// 路径的原始形式与规范化形式
fn path_forms(path: &Path) -> Vec<PathBuf> {
    let mut forms = vec![path.to_path_buf()];
    if let Ok(canonical) = std::fs::canonicalize(path) {
        if canonical != path {
            forms.push(canonical);
        }
    }
    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> (EventRouter, ServerConfig) {
        let config = ServerConfig::with_base_dir("/srv/imp");
        (EventRouter::new(&config), config)
    }

    #[test]
    fn test_inbox_upsert_is_arrival() {
        let (router, config) = router();
        let event = RawFsEvent::upserted(config.inbox_dir.join("a.imp"));
        assert_eq!(
            router.classify(&event),
            WatchEvent::Arrival {
                filename: "a.imp".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_extension_ignored() {
        let (router, config) = router();
        for name in ["a.txt", "a.imp.tmp", "a"] {
            let event = RawFsEvent::upserted(config.inbox_dir.join(name));
            assert_eq!(router.classify(&event), WatchEvent::Ignored, "{}", name);
        }
    }

    #[test]
    fn test_canonical_and_other_cache_files() {
        let (router, config) = router();
        assert_eq!(
            router.classify(&RawFsEvent::upserted(config.canonical_path())),
            WatchEvent::CanonicalChanged
        );
        assert_eq!(
            router.classify(&RawFsEvent::upserted(config.cache_dir.join("b.imp"))),
            WatchEvent::Created {
                location: WatchLocation::Cache,
                filename: "b.imp".to_string()
            }
        );
    }

    #[test]
    fn test_removals_are_logged_events() {
        let (router, config) = router();
        assert_eq!(
            router.classify(&RawFsEvent::removed(config.archive_dir.join("c.imp"))),
            WatchEvent::Removed {
                location: WatchLocation::Archive,
                filename: "c.imp".to_string()
            }
        );
        assert_eq!(
            router.classify(&RawFsEvent::removed(config.cache_dir.join("b.imp"))),
            WatchEvent::Removed {
                location: WatchLocation::Cache,
                filename: "b.imp".to_string()
            }
        );
    }

    #[test]
    fn test_canonical_removal_triggers_reload() {
        let (router, config) = router();
        assert_eq!(
            router.classify(&RawFsEvent::removed(config.canonical_path())),
            WatchEvent::CanonicalChanged
        );
    }

    #[test]
    fn test_skip_patterns_file_change() {
        let (router, config) = router();
        assert_eq!(
            router.classify(&RawFsEvent::upserted(&config.skip_patterns_file)),
            WatchEvent::SkipPatternsChanged
        );
        assert_eq!(
            router.classify(&RawFsEvent::upserted(&config.settings_file)),
            WatchEvent::Ignored
        );
    }

    #[test]
    fn test_unwatched_directory_ignored() {
        let (router, _) = router();
        let event = RawFsEvent::upserted("/elsewhere/a.imp");
        assert_eq!(router.classify(&event), WatchEvent::Ignored);
    }
}
