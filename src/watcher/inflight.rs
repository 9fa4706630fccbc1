// ==========================================
// IMP 批次导入服务 - 在途文件跟踪
// ==========================================
// 职责: 按文件名去重，同一文件名同时至多一个流水线
// 红线: 处理完成后保留宽限期，吸收重复的到达事件
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// 在途阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlightPhase {
    Settling,   // 等待写入稳定
    Processing, // 流水线执行中
    Grace,      // 宽限期
}

#[derive(Debug, Default)]
pub struct InFlightTracker {
    entries: Mutex<HashMap<String, InFlightPhase>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, InFlightPhase>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// 尝试登记文件名，已在途时返回 false
    pub fn try_acquire(&self, filename: &str) -> bool {
        let mut entries = self.entries();
        if entries.contains_key(filename) {
            return false;
        }
        entries.insert(filename.to_string(), InFlightPhase::Settling);
        true
    }

    /// 更新阶段（未登记的文件名忽略）
    pub fn mark(&self, filename: &str, phase: InFlightPhase) {
        if let Some(current) = self.entries().get_mut(filename) {
            *current = phase;
        }
    }

    pub fn release(&self, filename: &str) {
        self.entries().remove(filename);
    }

    /// 进入宽限期，延迟后释放
    pub fn release_after(self: &Arc<Self>, filename: &str, delay: Duration) -> JoinHandle<()> {
        self.mark(filename, InFlightPhase::Grace);
        let tracker = Arc::clone(self);
        let filename = filename.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracker.release(&filename);
            tracing::debug!(filename = %filename, "在途标记已释放");
        })
    }

    pub fn phase_of(&self, filename: &str) -> Option<InFlightPhase> {
        self.entries().get(filename).copied()
    }

    pub fn is_in_flight(&self, filename: &str) -> bool {
        self.entries().contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
