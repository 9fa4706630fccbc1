use super::core::{BatchLogRepository, TS_FORMAT};
use crate::domain::batch_log::BatchLogEntry;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT batch_id, filename, outcome, division_factor, skip_pattern,
           total_lines, qualifying_lines, runs_before, runs_after, split_count,
           cache_status, archive_status, source_status, error_message,
           started_at, finished_at
    FROM batch_log
"#;

impl BatchLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 batch_id 查询
    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<BatchLogEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE batch_id = ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![batch_id], map_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 最近的批次日志（按开始时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<BatchLogEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY started_at DESC, rowid DESC LIMIT ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 指定文件名的批次日志（按开始时间倒序）
    pub fn list_by_filename(
        &self,
        filename: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<BatchLogEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE filename = ? ORDER BY started_at DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params![filename, limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 按结果统计条数
    pub fn count_by_outcome(&self, outcome: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM batch_log WHERE outcome = ?",
            params![outcome],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ==========================================
// 辅助方法
// ==========================================

fn parse_ts(idx: usize, raw: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row(row: &Row) -> SqliteResult<BatchLogEntry> {
    let started_at_str: String = row.get(14)?;
    let finished_at_str: String = row.get(15)?;

    Ok(BatchLogEntry {
        batch_id: row.get(0)?,
        filename: row.get(1)?,
        outcome: row.get(2)?,
        division_factor: row.get(3)?,
        skip_pattern: row.get(4)?,
        total_lines: row.get(5)?,
        qualifying_lines: row.get(6)?,
        runs_before: row.get(7)?,
        runs_after: row.get(8)?,
        split_count: row.get(9)?,
        cache_status: row.get(10)?,
        archive_status: row.get(11)?,
        source_status: row.get(12)?,
        error_message: row.get(13)?,
        started_at: parse_ts(14, &started_at_str)?,
        finished_at: parse_ts(15, &finished_at_str)?,
    })
}
