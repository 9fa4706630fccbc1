// ==========================================
// IMP 批次导入服务 - 监听事件分发
// ==========================================
// 职责: 从有界事件队列取事件，按文件名派发独立任务
// 红线: 同一文件名同时至多一个流水线；单批次失败不影响监听
// ==========================================

use crate::config::ConfigStore;
use crate::importer::BatchProcessor;
use crate::snapshot::SnapshotPublisher;
use crate::watcher::event_router::{EventRouter, RawFsEvent, WatchEvent};
use crate::watcher::inflight::{InFlightPhase, InFlightTracker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ==========================================
// Dispatcher - 事件分发器
// ==========================================
pub struct Dispatcher {
    router: EventRouter,
    processor: Arc<dyn BatchProcessor>,
    config_store: Arc<ConfigStore>,
    publisher: Arc<SnapshotPublisher>,
    inflight: Arc<InFlightTracker>,
    settle_delay: Duration,
    grace_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        router: EventRouter,
        processor: Arc<dyn BatchProcessor>,
        config_store: Arc<ConfigStore>,
        publisher: Arc<SnapshotPublisher>,
        inflight: Arc<InFlightTracker>,
        settle_delay: Duration,
        grace_delay: Duration,
    ) -> Self {
        Self {
            router,
            processor,
            config_store,
            publisher,
            inflight,
            settle_delay,
            grace_delay,
        }
    }

    pub fn inflight(&self) -> &Arc<InFlightTracker> {
        &self.inflight
    }

    /// 消费事件队列直到发送端全部关闭
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<RawFsEvent>) {
        info!("监听分发器已启动");
        while let Some(raw) = rx.recv().await {
            self.handle(&raw);
        }
        info!("监听事件队列已关闭，分发器退出");
    }

    /// 处理单个原始事件，需要后台执行时返回任务句柄
    pub fn handle(&self, raw: &RawFsEvent) -> Option<JoinHandle<()>> {
        match self.router.classify(raw) {
            WatchEvent::Arrival { filename } => self.on_arrival(filename),
            WatchEvent::CanonicalChanged => Some(self.on_canonical_changed()),
            WatchEvent::SkipPatternsChanged => Some(self.on_skip_patterns_changed()),
            WatchEvent::Removed { location, filename } => {
                info!(location = location.as_str(), filename = %filename, "文件已删除");
                None
            }
            WatchEvent::Created { location, filename } => {
                debug!(location = location.as_str(), filename = %filename, "文件已写入");
                None
            }
            WatchEvent::Ignored => {
                debug!(path = %raw.path.display(), "忽略无关事件");
                None
            }
        }
    }

    fn on_arrival(&self, filename: String) -> Option<JoinHandle<()>> {
        if !self.inflight.try_acquire(&filename) {
            debug!(filename = %filename, "文件已在处理中，忽略重复事件");
            return None;
        }

        let processor = Arc::clone(&self.processor);
        let inflight = Arc::clone(&self.inflight);
        let settle = self.settle_delay;
        let grace = self.grace_delay;

        Some(tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            inflight.mark(&filename, InFlightPhase::Processing);

            match processor.process(&filename).await {
                Ok(outcome) => {
                    debug!(filename = %filename, outcome = outcome.as_str(), "批次任务结束");
                }
                Err(e) => {
                    warn!(filename = %filename, error = %e, "批次处理失败，继续监听");
                }
            }

            inflight.release_after(&filename, grace);
        }))
    }

    fn on_canonical_changed(&self) -> JoinHandle<()> {
        let publisher = Arc::clone(&self.publisher);
        let settle = self.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            if let Err(e) = publisher.refresh().await {
                warn!(error = %e, "规范文件变更后快照刷新失败");
            }
        })
    }

    fn on_skip_patterns_changed(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.config_store);
        tokio::spawn(async move {
            let result = store.reload_skip_patterns().await;
            debug!(result = ?result, "跳过模式重载完成");
        })
    }
}
