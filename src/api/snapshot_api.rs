// ==========================================
// IMP 批次导入服务 - 快照 API
// ==========================================
// 职责: 轮询当前快照、订阅推送
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::snapshot::Snapshot;
use crate::snapshot::{SnapshotPublisher, SnapshotSubscription};
use std::sync::Arc;

pub struct SnapshotApi {
    publisher: Arc<SnapshotPublisher>,
}

impl SnapshotApi {
    pub fn new(publisher: Arc<SnapshotPublisher>) -> Self {
        Self { publisher }
    }

    /// 当前快照（条目列表或无数据标记）
    pub fn get_current(&self) -> ApiResult<Arc<Snapshot>> {
        Ok(self.publisher.current()?)
    }

    /// 当前快照的 JSON 形态
    ///
    /// `{"entries":[{"id":..,"value":..}]}` 或 `{"message":"NO DIMTER FILER"}`
    pub fn get_current_json(&self) -> ApiResult<String> {
        let snapshot = self.get_current()?;
        serde_json::to_string(snapshot.as_ref())
            .map_err(|e| ApiError::InternalError(format!("快照序列化失败: {}", e)))
    }

    /// 订阅快照推送
    pub fn subscribe(&self) -> SnapshotSubscription {
        self.publisher.subscribe()
    }
}
