// ==========================================
// IMP 批次导入服务 - 批次领域模型
// ==========================================
// 职责: 批次行、派生记录、运行号分布与处理结果
// 红线: 记录只允许插入一个派生字段，顺序永不改变
// ==========================================

use crate::domain::types::{RunKey, FIELD_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// BatchLine - 批次中的一行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchLine {
    /// 空行或字段数不足的行，原样输出，不参与运行号统计
    Passthrough(String),
    /// 合格记录
    Record(RunRecord),
}

/// 合格记录：原始字段 + 派生运行号
///
/// 运行号在输出时插入到尾字段之前。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub fields: Vec<String>,
    pub run: RunKey,
}

impl RunRecord {
    /// 渲染为输出行（字段数 = 原字段数 + 1）
    pub fn render(&self) -> String {
        let split_at = self.fields.len().saturating_sub(1);
        let mut out: Vec<String> = Vec::with_capacity(self.fields.len() + 1);
        out.extend(self.fields[..split_at].iter().cloned());
        out.push(self.run.to_string());
        out.extend(self.fields[split_at..].iter().cloned());
        out.join(&FIELD_SEPARATOR.to_string())
    }
}

// ==========================================
// TransformedBatch - 派生后的批次
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformedBatch {
    pub lines: Vec<BatchLine>,
}

impl TransformedBatch {
    /// 合格记录的运行号（按文件顺序）
    pub fn run_keys(&self) -> Vec<RunKey> {
        self.records().map(|r| r.run).collect()
    }

    /// 按文件顺序回写运行号
    ///
    /// `keys` 的长度必须等于合格记录数，多余或不足的部分被忽略。
    pub fn apply_run_keys(&mut self, keys: &[RunKey]) {
        let records = self.lines.iter_mut().filter_map(|line| match line {
            BatchLine::Record(record) => Some(record),
            BatchLine::Passthrough(_) => None,
        });
        for (record, key) in records.zip(keys.iter()) {
            record.run = *key;
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &RunRecord> {
        self.lines.iter().filter_map(|line| match line {
            BatchLine::Record(record) => Some(record),
            BatchLine::Passthrough(_) => None,
        })
    }

    pub fn qualifying_count(&self) -> usize {
        self.records().count()
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    /// 渲染为最终文件内容（按 '\n' 拼接，保留原有的行尾结构）
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                BatchLine::Passthrough(raw) => raw.clone(),
                BatchLine::Record(record) => record.render(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ==========================================
// 运行号分布与拆分记录
// ==========================================

/// 单个运行号的成员数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    pub run: RunKey,
    pub count: usize,
}

/// 一次拆分操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitStep {
    /// 被拆分的运行号
    pub run: i64,
    /// 拆分前成员数
    pub before: usize,
    /// 保留在原运行号的成员数
    pub kept: usize,
    /// 移入 run+1 的成员数
    pub moved: usize,
}

// ==========================================
// 落盘结果
// ==========================================

/// 单个落盘操作的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageOpStatus {
    Done,
    Failed(String),
    NotRequested,
}

impl StageOpStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOpStatus::Failed(_))
    }
}

impl fmt::Display for StageOpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOpStatus::Done => write!(f, "DONE"),
            StageOpStatus::Failed(msg) => write!(f, "FAILED: {}", msg),
            StageOpStatus::NotRequested => write!(f, "NOT_REQUESTED"),
        }
    }
}

/// 三个落盘操作（缓存写入、归档写入、源文件删除）各自的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub cache: StageOpStatus,
    pub archive: StageOpStatus,
    pub source_removed: StageOpStatus,
}

impl StageReport {
    pub fn has_failure(&self) -> bool {
        self.cache.is_failed() || self.archive.is_failed() || self.source_removed.is_failed()
    }
}

// ==========================================
// 批次处理结果
// ==========================================

/// 完整处理（派生 + 拆分 + 落盘）的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub filename: String,
    pub division_factor: u32,
    pub factor_is_default: bool,
    pub total_lines: usize,
    pub qualifying_lines: usize,
    pub initial_runs: Vec<RunTally>,
    pub final_runs: Vec<RunTally>,
    pub splits: Vec<SplitStep>,
    pub stage: StageReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchOutcome {
    /// 已派生、拆分并落盘
    Processed(BatchReport),
    /// 首行命中跳过模式，原样归档
    Skipped {
        batch_id: String,
        filename: String,
        pattern: String,
        stage: StageReport,
    },
    /// 处理前源文件已消失（已被消费）
    Vanished { batch_id: String, filename: String },
}

impl BatchOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            BatchOutcome::Processed(_) => "PROCESSED",
            BatchOutcome::Skipped { .. } => "SKIPPED",
            BatchOutcome::Vanished { .. } => "VANISHED",
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            BatchOutcome::Processed(report) => &report.filename,
            BatchOutcome::Skipped { filename, .. } => filename,
            BatchOutcome::Vanished { filename, .. } => filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str], run: RunKey) -> RunRecord {
        RunRecord {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            run,
        }
    }

    #[test]
    fn test_record_render_inserts_before_trailing_field() {
        let r = record(&["A", "B", "40"], RunKey::Id(10));
        assert_eq!(r.render(), "A;B;10;40");

        let undefined = record(&["A", "x"], RunKey::Undefined);
        assert_eq!(undefined.render(), "A;NaN;x");
    }

    #[test]
    fn test_apply_run_keys_skips_passthrough() {
        let mut batch = TransformedBatch {
            lines: vec![
                BatchLine::Record(record(&["A", "4"], RunKey::Id(1))),
                BatchLine::Passthrough(String::new()),
                BatchLine::Record(record(&["B", "8"], RunKey::Id(2))),
            ],
        };

        batch.apply_run_keys(&[RunKey::Id(5), RunKey::Id(6)]);

        assert_eq!(batch.run_keys(), vec![RunKey::Id(5), RunKey::Id(6)]);
        assert_eq!(batch.render(), "A;5;4\n\nB;6;8");
        assert_eq!(batch.qualifying_count(), 2);
        assert_eq!(batch.total_lines(), 3);
    }

    #[test]
    fn test_stage_report_failure_flag() {
        let report = StageReport {
            cache: StageOpStatus::Done,
            archive: StageOpStatus::Failed("disk full".to_string()),
            source_removed: StageOpStatus::Done,
        };
        assert!(report.has_failure());
    }
}
