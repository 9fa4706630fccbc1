// ==========================================
// IMP 批次导入服务 - 批次日志领域模型
// ==========================================
// 职责: 每次流水线执行的持久化记录（对齐 batch_log 表）
// ==========================================

use crate::domain::batch::{BatchOutcome, StageOpStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// BatchLogEntry - 批次日志
// ==========================================
// 用途: 审计追踪（哪个文件、何时、拆分了几次、落盘是否成功）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchLogEntry {
    // ===== 主键 =====
    pub batch_id: String,
    pub filename: String,
    pub outcome: String, // PROCESSED / SKIPPED / VANISHED / FAILED

    // ===== 派生参数 =====
    pub division_factor: Option<u32>,
    pub skip_pattern: Option<String>,

    // ===== 统计 =====
    pub total_lines: i64,
    pub qualifying_lines: i64,
    pub runs_before: i64,
    pub runs_after: i64,
    pub split_count: i64,

    // ===== 落盘结果 =====
    pub cache_status: Option<String>,
    pub archive_status: Option<String>,
    pub source_status: Option<String>,

    // ===== 失败原因 =====
    pub error_message: Option<String>,

    // ===== 时间戳 =====
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
}

impl BatchLogEntry {
    fn empty(
        batch_id: &str,
        filename: &str,
        outcome: &str,
        started_at: NaiveDateTime,
        finished_at: NaiveDateTime,
    ) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            filename: filename.to_string(),
            outcome: outcome.to_string(),
            division_factor: None,
            skip_pattern: None,
            total_lines: 0,
            qualifying_lines: 0,
            runs_before: 0,
            runs_after: 0,
            split_count: 0,
            cache_status: None,
            archive_status: None,
            source_status: None,
            error_message: None,
            started_at,
            finished_at,
        }
    }

    /// 由处理结果构造日志
    pub fn from_outcome(
        outcome: &BatchOutcome,
        started_at: NaiveDateTime,
        finished_at: NaiveDateTime,
    ) -> Self {
        match outcome {
            BatchOutcome::Processed(report) => {
                let mut entry = Self::empty(
                    &report.batch_id,
                    &report.filename,
                    outcome.as_str(),
                    started_at,
                    finished_at,
                );
                entry.division_factor = Some(report.division_factor);
                entry.total_lines = report.total_lines as i64;
                entry.qualifying_lines = report.qualifying_lines as i64;
                entry.runs_before = report.initial_runs.len() as i64;
                entry.runs_after = report.final_runs.len() as i64;
                entry.split_count = report.splits.len() as i64;
                entry.cache_status = Some(status_text(&report.stage.cache));
                entry.archive_status = Some(status_text(&report.stage.archive));
                entry.source_status = Some(status_text(&report.stage.source_removed));
                entry
            }
            BatchOutcome::Skipped {
                batch_id,
                filename,
                pattern,
                stage,
            } => {
                let mut entry =
                    Self::empty(batch_id, filename, outcome.as_str(), started_at, finished_at);
                entry.skip_pattern = Some(pattern.clone());
                entry.cache_status = Some(status_text(&stage.cache));
                entry.archive_status = Some(status_text(&stage.archive));
                entry.source_status = Some(status_text(&stage.source_removed));
                entry
            }
            BatchOutcome::Vanished { batch_id, filename } => {
                Self::empty(batch_id, filename, outcome.as_str(), started_at, finished_at)
            }
        }
    }

    /// 流水线失败时的日志
    pub fn failed(
        batch_id: &str,
        filename: &str,
        error_message: String,
        started_at: NaiveDateTime,
        finished_at: NaiveDateTime,
    ) -> Self {
        let mut entry = Self::empty(batch_id, filename, "FAILED", started_at, finished_at);
        entry.error_message = Some(error_message);
        entry
    }
}

fn status_text(status: &StageOpStatus) -> String {
    status.to_string()
}
