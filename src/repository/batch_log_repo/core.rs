use crate::domain::batch_log::BatchLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式（毫秒精度，保证同秒内的排序）
pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ==========================================
// BatchLogRepository - 批次日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct BatchLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchLogRepository {
    /// 创建批次日志仓储（建表为 best-effort，不阻塞服务启动）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        if let Err(e) = repo.ensure_table() {
            tracing::warn!("batch_log ensure failed: {}", e);
        }
        repo
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建 batch_log 表（幂等）
    pub fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS batch_log (
              batch_id TEXT PRIMARY KEY,
              filename TEXT NOT NULL,
              outcome TEXT NOT NULL,
              division_factor INTEGER,
              skip_pattern TEXT,
              total_lines INTEGER NOT NULL DEFAULT 0,
              qualifying_lines INTEGER NOT NULL DEFAULT 0,
              runs_before INTEGER NOT NULL DEFAULT 0,
              runs_after INTEGER NOT NULL DEFAULT 0,
              split_count INTEGER NOT NULL DEFAULT 0,
              cache_status TEXT,
              archive_status TEXT,
              source_status TEXT,
              error_message TEXT,
              started_at TEXT NOT NULL,
              finished_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_batch_log_started
              ON batch_log(started_at DESC);
            CREATE INDEX IF NOT EXISTS idx_batch_log_filename
              ON batch_log(filename, started_at DESC);
            "#,
        )?;
        Ok(())
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入批次日志
    ///
    /// # 返回
    /// - `Ok(batch_id)`: 成功插入
    /// - `Err(UniqueConstraintViolation)`: batch_id 重复
    pub fn insert(&self, entry: &BatchLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO batch_log (
                batch_id, filename, outcome, division_factor, skip_pattern,
                total_lines, qualifying_lines, runs_before, runs_after, split_count,
                cache_status, archive_status, source_status, error_message,
                started_at, finished_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.batch_id,
                entry.filename,
                entry.outcome,
                entry.division_factor,
                entry.skip_pattern,
                entry.total_lines,
                entry.qualifying_lines,
                entry.runs_before,
                entry.runs_after,
                entry.split_count,
                entry.cache_status,
                entry.archive_status,
                entry.source_status,
                entry.error_message,
                entry.started_at.format(TS_FORMAT).to_string(),
                entry.finished_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(entry.batch_id.clone())
    }
}
