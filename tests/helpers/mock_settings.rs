// ==========================================
// Mock 设置与批次处理实现 - 用于集成测试
// ==========================================
#![allow(dead_code)]

use async_trait::async_trait;
use imp_server::config::SettingsReader;
use imp_server::domain::types::DivisionFactor;
use imp_server::domain::BatchOutcome;
use imp_server::importer::{BatchProcessor, IngestResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 固定值设置
#[derive(Debug, Clone)]
pub struct MockSettings {
    pub factor: DivisionFactor,
    pub patterns: Arc<Vec<String>>,
}

impl MockSettings {
    pub fn with_factor(value: u32) -> Self {
        Self {
            factor: DivisionFactor::from_settings(value),
            patterns: Arc::new(vec!["-VKa".to_string()]),
        }
    }

    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = Arc::new(patterns.iter().map(|p| p.to_string()).collect());
        self
    }
}

#[async_trait]
impl SettingsReader for MockSettings {
    async fn get_division_factor(&self) -> DivisionFactor {
        self.factor
    }

    async fn get_skip_patterns(&self) -> Arc<Vec<String>> {
        self.patterns.clone()
    }
}

/// 计数批次处理器（不做任何文件操作）
#[derive(Debug, Default)]
pub struct CountingProcessor {
    calls: AtomicUsize,
    filenames: Mutex<Vec<String>>,
    delay: Duration,
}

impl CountingProcessor {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn filenames(&self) -> Vec<String> {
        self.filenames.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchProcessor for CountingProcessor {
    async fn process(&self, filename: &str) -> IngestResult<BatchOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.filenames.lock().unwrap().push(filename.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(BatchOutcome::Vanished {
            batch_id: "test".to_string(),
            filename: filename.to_string(),
        })
    }
}
