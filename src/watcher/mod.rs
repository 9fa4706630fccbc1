// ==========================================
// IMP 批次导入服务 - 目录监听层
// ==========================================
// 职责: 文件系统通知 → 有界事件队列 → 按文件名派发任务
// 红线: 同一文件名同时至多一个流水线
// ==========================================

pub mod dispatcher;
pub mod error;
pub mod event_router;
pub mod fs_watcher;
pub mod inflight;

pub use dispatcher::Dispatcher;
pub use error::{WatchError, WatchResult};
pub use event_router::{EventRouter, FsChange, RawFsEvent, WatchEvent, WatchLocation};
pub use inflight::{InFlightPhase, InFlightTracker};

use notify::RecommendedWatcher;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ==========================================
// WatcherHandle - 运行中的监听
// ==========================================
pub struct WatcherHandle {
    watcher: Option<RecommendedWatcher>,
    dispatcher: JoinHandle<()>,
}

impl WatcherHandle {
    /// 启动监听：notify 后端 + 分发器任务
    pub fn start(
        dirs: &[PathBuf],
        dispatcher: Arc<Dispatcher>,
        queue_capacity: usize,
    ) -> WatchResult<Self> {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let watcher = fs_watcher::spawn_fs_watcher(dirs, tx)?;
        let dispatcher = tokio::spawn(dispatcher.run(rx));
        Ok(Self {
            watcher: Some(watcher),
            dispatcher,
        })
    }

    /// 停止监听并等待分发器退出
    ///
    /// 已开始的批次任务不取消，继续执行至结束。
    pub async fn shutdown(mut self) {
        // 丢弃 watcher 会关闭队列发送端，分发器随之退出
        drop(self.watcher.take());
        if let Err(e) = (&mut self.dispatcher).await {
            tracing::warn!(error = %e, "分发器任务异常退出");
        }
        tracing::info!("目录监听已停止");
    }
}
