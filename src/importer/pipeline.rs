// ==========================================
// IMP 批次导入服务 - 批次流水线
// ==========================================
// 职责: 整合单个批次的处理流程
// 流程: 读取 → 跳过判断 → 派生 → 拆分 → 落盘 → 记录批次日志
// 红线: 单批次失败不影响其他批次，批次日志失败不影响批次结果
// ==========================================

use crate::config::SettingsReader;
use crate::domain::batch::{BatchOutcome, BatchReport, RunTally};
use crate::domain::batch_log::BatchLogEntry;
use crate::engine::run_balancer::RunBalancer;
use crate::importer::batch_processor_trait::BatchProcessor;
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::skip_filter::match_skip_pattern;
use crate::importer::stage_writer::StageWriter;
use crate::importer::transformer::RecordTransformer;
use crate::repository::BatchLogRepository;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// BatchPipeline - 批次流水线
// ==========================================
pub struct BatchPipeline {
    inbox_dir: PathBuf,
    settings: Arc<dyn SettingsReader>,
    balancer: RunBalancer,
    writer: StageWriter,
    journal: Option<Arc<BatchLogRepository>>,
}

impl BatchPipeline {
    pub fn new(
        inbox_dir: impl Into<PathBuf>,
        settings: Arc<dyn SettingsReader>,
        writer: StageWriter,
    ) -> Self {
        Self {
            inbox_dir: inbox_dir.into(),
            settings,
            balancer: RunBalancer::new(),
            writer,
            journal: None,
        }
    }

    /// 挂接批次日志
    pub fn with_journal(mut self, journal: Arc<BatchLogRepository>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// 替换拆分器（测试中用于缩小容量）
    pub fn with_balancer(mut self, balancer: RunBalancer) -> Self {
        self.balancer = balancer;
        self
    }

    pub fn inbox_dir(&self) -> &Path {
        &self.inbox_dir
    }

    pub fn writer(&self) -> &StageWriter {
        &self.writer
    }

    async fn run(&self, batch_id: &str, filename: &str) -> IngestResult<BatchOutcome> {
        let source = self.inbox_dir.join(filename);

        // ===== 1. 读取源文件 =====
        let raw = match tokio::fs::read(&source).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(filename, "源文件已不存在，忽略");
                return Ok(BatchOutcome::Vanished {
                    batch_id: batch_id.to_string(),
                    filename: filename.to_string(),
                });
            }
            Err(e) => {
                return Err(IngestError::FileRead {
                    path: source.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        // ===== 2. 跳过判断 =====
        let patterns = self.settings.get_skip_patterns().await;
        if let Some(pattern) = match_skip_pattern(&raw, &patterns) {
            info!(filename, pattern = %pattern, "首行命中跳过模式，原样归档");
            let stage = self.writer.stage_skipped(&source, filename, &raw).await;
            return Ok(BatchOutcome::Skipped {
                batch_id: batch_id.to_string(),
                filename: filename.to_string(),
                pattern,
                stage,
            });
        }

        // ===== 3. 派生运行号 =====
        let factor = self.settings.get_division_factor().await;
        info!(
            filename,
            division_factor = factor.value,
            source = %factor.source,
            "使用除数"
        );

        let content = String::from_utf8(raw).map_err(|e| IngestError::Encoding {
            path: source.display().to_string(),
            message: e.to_string(),
        })?;

        let transformer = RecordTransformer::new(factor.value);
        let mut batch = transformer.transform(&content);

        // ===== 4. 运行号拆分 =====
        let outcome = self.balancer.balance(&batch.run_keys());
        info!(
            filename,
            runs = %describe_runs(&outcome.initial),
            "初始运行号分布"
        );
        for step in &outcome.splits {
            info!(
                filename,
                run = step.run,
                before = step.before,
                kept = step.kept,
                moved = step.moved,
                "运行号超出容量，已拆分"
            );
        }
        info!(
            filename,
            runs = %describe_runs(&outcome.final_runs),
            "最终运行号分布"
        );
        batch.apply_run_keys(&outcome.keys);

        // ===== 5. 落盘 =====
        let rendered = batch.render();
        let stage = self
            .writer
            .stage_processed(&source, filename, &rendered)
            .await;
        if stage.has_failure() {
            warn!(filename, stage = ?stage, "部分落盘操作失败");
        }

        Ok(BatchOutcome::Processed(BatchReport {
            batch_id: batch_id.to_string(),
            filename: filename.to_string(),
            division_factor: factor.value,
            factor_is_default: factor.is_default(),
            total_lines: batch.total_lines(),
            qualifying_lines: batch.qualifying_count(),
            initial_runs: outcome.initial,
            final_runs: outcome.final_runs,
            splits: outcome.splits,
            stage,
        }))
    }

    /// 写入批次日志（失败只记录日志）
    fn record(&self, entry: BatchLogEntry) {
        let Some(journal) = &self.journal else {
            return;
        };
        if let Err(e) = journal.insert(&entry) {
            warn!(batch_id = %entry.batch_id, error = %e, "批次日志写入失败");
        }
    }
}

#[async_trait]
impl BatchProcessor for BatchPipeline {
    #[instrument(skip(self), fields(batch_id))]
    async fn process(&self, filename: &str) -> IngestResult<BatchOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        let started_at = now();
        info!(filename, "检测到新批次");

        let result = self.run(&batch_id, filename).await;
        let finished_at = now();

        match &result {
            Ok(outcome) => {
                info!(filename, outcome = outcome.as_str(), "批次处理完成");
                if !matches!(outcome, BatchOutcome::Vanished { .. }) {
                    self.record(BatchLogEntry::from_outcome(outcome, started_at, finished_at));
                }
            }
            Err(e) => {
                error!(filename, error = %e, "批次处理失败");
                self.record(BatchLogEntry::failed(
                    &batch_id,
                    filename,
                    e.to_string(),
                    started_at,
                    finished_at,
                ));
            }
        }

        result
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// 运行号分布的紧凑文本，例如 "1:3, 2:999, NaN:1"
pub fn describe_runs(runs: &[RunTally]) -> String {
    if runs.is_empty() {
        return "(空)".to_string();
    }
    runs.iter()
        .map(|t| format!("{}:{}", t.run, t.count))
        .collect::<Vec<_>>()
        .join(", ")
}
