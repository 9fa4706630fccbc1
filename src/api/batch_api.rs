// ==========================================
// IMP 批次导入服务 - 批次日志 API
// ==========================================
// 职责: 批次处理记录的查询
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::batch_log::BatchLogEntry;
use crate::repository::BatchLogRepository;
use std::sync::Arc;

/// 单次查询的最大条数
pub const MAX_QUERY_LIMIT: usize = 1000;

pub struct BatchApi {
    repo: Arc<BatchLogRepository>,
}

impl BatchApi {
    pub fn new(repo: Arc<BatchLogRepository>) -> Self {
        Self { repo }
    }

    /// 最近的批次记录（新的在前）
    pub fn list_recent(&self, limit: usize) -> ApiResult<Vec<BatchLogEntry>> {
        let limit = validate_limit(limit)?;
        Ok(self.repo.list_recent(limit)?)
    }

    /// 指定文件名的批次记录（新的在前）
    pub fn list_by_filename(&self, filename: &str, limit: usize) -> ApiResult<Vec<BatchLogEntry>> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(ApiError::InvalidInput("文件名不能为空".to_string()));
        }
        let limit = validate_limit(limit)?;
        Ok(self.repo.list_by_filename(filename, limit)?)
    }

    /// 单个批次记录
    pub fn get_batch(&self, batch_id: &str) -> ApiResult<BatchLogEntry> {
        self.repo
            .find_by_id(batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("批次(batch_id={})不存在", batch_id)))
    }
}

fn validate_limit(limit: usize) -> ApiResult<usize> {
    if limit == 0 || limit > MAX_QUERY_LIMIT {
        return Err(ApiError::InvalidInput(format!(
            "limit 必须在 1..={} 之间: {}",
            MAX_QUERY_LIMIT, limit
        )));
    }
    Ok(limit)
}
