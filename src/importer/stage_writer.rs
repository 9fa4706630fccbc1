// ==========================================
// IMP 批次导入服务 - 落盘写入
// ==========================================
// 职责: 缓存写入 / 归档写入 / 源文件删除
// 红线: 三个操作相互独立，互不等待，失败不回滚其他操作，不自动重试
// ==========================================

use crate::domain::batch::{StageOpStatus, StageReport};
use crate::importer::error::IngestError;
use std::path::{Path, PathBuf};

// ==========================================
// StageWriter - 落盘写入器
// ==========================================
#[derive(Debug, Clone)]
pub struct StageWriter {
    cache_dir: PathBuf,
    archive_dir: PathBuf,
}

impl StageWriter {
    pub fn new(cache_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn cache_path(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    pub fn archive_path(&self, filename: &str) -> PathBuf {
        self.archive_dir.join(filename)
    }

    /// 已派生批次落盘：写缓存（覆盖）+ 写归档 + 删除源文件
    pub async fn stage_processed(&self, source: &Path, filename: &str, content: &str) -> StageReport {
        let cache_path = self.cache_path(filename);
        let archive_path = self.archive_path(filename);

        let (cache, archive, source_removed) = futures::join!(
            write_op("cache", &cache_path, content.as_bytes()),
            write_op("archive", &archive_path, content.as_bytes()),
            remove_op(source),
        );

        StageReport {
            cache,
            archive,
            source_removed,
        }
    }

    /// 跳过批次落盘：原样写归档 + 删除源文件，不产生缓存副本
    pub async fn stage_skipped(&self, source: &Path, filename: &str, raw: &[u8]) -> StageReport {
        let archive_path = self.archive_path(filename);

        let (archive, source_removed) =
            futures::join!(write_op("archive", &archive_path, raw), remove_op(source));

        StageReport {
            cache: StageOpStatus::NotRequested,
            archive,
            source_removed,
        }
    }
}

async fn write_op(op: &'static str, path: &Path, bytes: &[u8]) -> StageOpStatus {
    match tokio::fs::write(path, bytes).await {
        Ok(()) => {
            tracing::info!(op, path = %path.display(), bytes = bytes.len(), "落盘写入成功");
            StageOpStatus::Done
        }
        Err(e) => {
            let err = IngestError::Persistence {
                op,
                path: path.display().to_string(),
                message: e.to_string(),
            };
            tracing::error!("{}", err);
            StageOpStatus::Failed(e.to_string())
        }
    }
}

async fn remove_op(path: &Path) -> StageOpStatus {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "源文件已删除");
            StageOpStatus::Done
        }
        Err(e) => {
            let err = IngestError::Persistence {
                op: "remove_source",
                path: path.display().to_string(),
                message: e.to_string(),
            };
            tracing::error!("{}", err);
            StageOpStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Dirs {
        _root: TempDir,
        inbox: PathBuf,
        cache: PathBuf,
        archive: PathBuf,
    }

    fn setup() -> Dirs {
        let root = TempDir::new().unwrap();
        let inbox = root.path().join("SOURCE");
        let cache = root.path().join("TEMP");
        let archive = root.path().join("SAV");
        for dir in [&inbox, &cache, &archive] {
            std::fs::create_dir_all(dir).unwrap();
        }
        Dirs {
            _root: root,
            inbox,
            cache,
            archive,
        }
    }

    #[tokio::test]
    async fn test_stage_processed_writes_both_and_removes_source() {
        let dirs = setup();
        let source = dirs.inbox.join("a.imp");
        std::fs::write(&source, "A;B;40").unwrap();
        std::fs::write(dirs.cache.join("a.imp"), "old").unwrap();

        let writer = StageWriter::new(&dirs.cache, &dirs.archive);
        let report = writer.stage_processed(&source, "a.imp", "A;B;10;40").await;

        assert!(!report.has_failure());
        assert_eq!(std::fs::read_to_string(dirs.cache.join("a.imp")).unwrap(), "A;B;10;40");
        assert_eq!(std::fs::read_to_string(dirs.archive.join("a.imp")).unwrap(), "A;B;10;40");
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_stage_skipped_has_no_cache_copy() {
        let dirs = setup();
        let source = dirs.inbox.join("s.imp");
        let raw = b"HEAD-VKa\r\nX;1\n".to_vec();
        std::fs::write(&source, &raw).unwrap();

        let writer = StageWriter::new(&dirs.cache, &dirs.archive);
        let report = writer.stage_skipped(&source, "s.imp", &raw).await;

        assert_eq!(report.cache, StageOpStatus::NotRequested);
        assert_eq!(report.archive, StageOpStatus::Done);
        assert_eq!(std::fs::read(dirs.archive.join("s.imp")).unwrap(), raw);
        assert!(!dirs.cache.join("s.imp").exists());
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_one_failed_op_does_not_block_others() {
        let dirs = setup();
        let source = dirs.inbox.join("b.imp");
        std::fs::write(&source, "A;8").unwrap();

        // 归档目录不存在 → 归档写入失败，缓存写入与删除照常完成
        let writer = StageWriter::new(&dirs.cache, dirs.archive.join("missing"));
        let report = writer.stage_processed(&source, "b.imp", "A;2;8").await;

        assert_eq!(report.cache, StageOpStatus::Done);
        assert!(report.archive.is_failed());
        assert_eq!(report.source_removed, StageOpStatus::Done);
        assert!(!source.exists());
    }
}
