// ==========================================
// IMP 批次导入服务 - 快照发布
// ==========================================
// 职责: 持有当前快照，规范文件变更时重新加载并推送
// 红线: 读取/解析失败只推送错误事件，已持有快照保持不变
// 说明: 推送为非阻塞广播，订阅者滞后不影响流水线
// ==========================================

use crate::domain::snapshot::Snapshot;
use crate::snapshot::error::{SnapshotError, SnapshotResult};
use crate::snapshot::parser::parse_snapshot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// 推送给订阅者的错误事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotErrorEvent {
    pub error: String,
}

/// 订阅者收到的事件
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    Updated(Arc<Snapshot>),
    Error(SnapshotErrorEvent),
}

impl SnapshotEvent {
    /// 事件名称（与现有前端的事件名一致）
    pub fn as_str(&self) -> &str {
        match self {
            SnapshotEvent::Updated(_) => "dimterData",
            SnapshotEvent::Error(_) => "dimterError",
        }
    }
}

// ==========================================
// SnapshotPublisher - 快照发布者
// ==========================================
pub struct SnapshotPublisher {
    canonical_path: PathBuf,
    current: RwLock<Arc<Snapshot>>,
    updates: broadcast::Sender<Arc<Snapshot>>,
    errors: broadcast::Sender<SnapshotErrorEvent>,
    // 串行化重新加载，保证后读到的内容后发布
    refresh_lock: tokio::sync::Mutex<()>,
}

impl SnapshotPublisher {
    pub fn new(canonical_path: impl Into<PathBuf>, channel_capacity: usize) -> Self {
        let capacity = channel_capacity.max(1);
        let (updates, _) = broadcast::channel(capacity);
        let (errors, _) = broadcast::channel(capacity);
        Self {
            canonical_path: canonical_path.into(),
            current: RwLock::new(Arc::new(Snapshot::default())),
            updates,
            errors,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }

    /// 当前快照（轮询入口）
    pub fn current(&self) -> SnapshotResult<Arc<Snapshot>> {
        self.current
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| SnapshotError::LockPoisoned(e.to_string()))
    }

    /// 订阅推送
    pub fn subscribe(self: &Arc<Self>) -> SnapshotSubscription {
        SnapshotSubscription {
            publisher: Arc::clone(self),
            updates: self.updates.subscribe(),
            errors: self.errors.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }

    /// 重新加载规范文件
    ///
    /// - 文件不存在 → 无数据标记（替换并推送）
    /// - 读取或解析失败 → 推送错误事件，返回错误，快照不变
    /// - 成功 → 替换并推送
    pub async fn refresh(&self) -> SnapshotResult<Arc<Snapshot>> {
        let _guard = self.refresh_lock.lock().await;

        let snapshot = match self.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.canonical_path.display(), error = %e, "快照加载失败，保留当前快照");
                self.publish_error(&e);
                return Err(e);
            }
        };

        let snapshot = Arc::new(snapshot);
        self.install(Arc::clone(&snapshot))?;

        if snapshot.is_no_data() {
            info!(path = %self.canonical_path.display(), "规范文件不存在，快照置为无数据");
        } else {
            info!(entries = snapshot.len(), "快照已加载");
        }

        // 没有订阅者时发送失败属于正常情况
        if self.updates.send(Arc::clone(&snapshot)).is_err() {
            debug!("当前没有快照订阅者");
        }

        Ok(snapshot)
    }

    async fn load(&self) -> SnapshotResult<Snapshot> {
        let raw = match tokio::fs::read(&self.canonical_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Snapshot::no_data()),
            Err(e) => {
                return Err(SnapshotError::Read {
                    path: self.canonical_path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        let content = String::from_utf8(raw).map_err(|e| SnapshotError::Parse {
            path: self.canonical_path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(parse_snapshot(&content))
    }

    fn install(&self, snapshot: Arc<Snapshot>) -> SnapshotResult<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|e| SnapshotError::LockPoisoned(e.to_string()))?;
        *guard = snapshot;
        Ok(())
    }

    fn publish_error(&self, err: &SnapshotError) {
        let filename = self
            .canonical_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let event = SnapshotErrorEvent {
            error: err.public_message(&filename),
        };
        if self.errors.send(event).is_err() {
            debug!("当前没有快照错误订阅者");
        }
    }
}

// ==========================================
// SnapshotSubscription - 订阅句柄
// ==========================================
pub struct SnapshotSubscription {
    publisher: Arc<SnapshotPublisher>,
    updates: broadcast::Receiver<Arc<Snapshot>>,
    errors: broadcast::Receiver<SnapshotErrorEvent>,
}

impl SnapshotSubscription {
    /// 立即返回当前快照（不重放历史）
    pub fn request_current(&self) -> SnapshotResult<Arc<Snapshot>> {
        self.publisher.current()
    }

    /// 等待下一个事件
    ///
    /// 更新通道滞后时直接交付最新快照；发布者关闭时返回 None。
    pub async fn recv(&mut self) -> Option<SnapshotEvent> {
        loop {
            tokio::select! {
                update = self.updates.recv() => match update {
                    Ok(snapshot) => return Some(SnapshotEvent::Updated(snapshot)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "快照订阅者滞后，直接交付最新快照");
                        match self.publisher.current() {
                            Ok(snapshot) => return Some(SnapshotEvent::Updated(snapshot)),
                            Err(e) => {
                                warn!(error = %e, "读取当前快照失败");
                                continue;
                            }
                        }
                    }
                    Err(RecvError::Closed) => return None,
                },
                error = self.errors.recv() => match error {
                    Ok(event) => return Some(SnapshotEvent::Error(event)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "快照错误事件滞后");
                        continue;
                    }
                    Err(RecvError::Closed) => return None,
                },
            }
        }
    }
}
