// ==========================================
// IMP 批次导入服务 - 设置 API
// ==========================================
// 职责: 除数的读取与写入，跳过模式的查询
// 红线: 写入前校验，非法输入不修改已保存的设置
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigStore, SkipPatternReload};
use crate::domain::types::{DivisionFactor, FactorSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 除数查询结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionFactorView {
    pub value: u32,
    /// 设置不可用时为 true（value 为默认值 4）
    pub is_default: bool,
    pub source: FactorSource,
}

impl From<DivisionFactor> for DivisionFactorView {
    fn from(factor: DivisionFactor) -> Self {
        Self {
            value: factor.value,
            is_default: factor.is_default(),
            source: factor.source,
        }
    }
}

// ==========================================
// SettingsApi - 设置 API
// ==========================================
pub struct SettingsApi {
    store: Arc<ConfigStore>,
}

impl SettingsApi {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// 查询当前生效的除数
    pub async fn get_division_factor(&self) -> DivisionFactorView {
        self.store.read_division_factor().await.into()
    }

    /// 设置除数
    ///
    /// # 参数
    /// - raw: 调用方提交的原始文本
    ///
    /// # 返回
    /// - Ok(value): 已保存的值
    /// - Err(ValidationError): 非正整数，设置未修改
    /// - Err(InternalError): 写入失败
    pub async fn set_division_factor(&self, raw: &str) -> ApiResult<u32> {
        let value = validate_division_factor(raw)?;

        self.store
            .write_division_factor(value)
            .await
            .map_err(|e| ApiError::InternalError(format!("保存除数设置失败: {}", e)))?;

        Ok(value)
    }

    /// 当前生效的跳过模式
    pub fn get_skip_patterns(&self) -> Vec<String> {
        self.store.skip_patterns().as_ref().clone()
    }

    /// 手动触发跳过模式重载
    pub async fn reload_skip_patterns(&self) -> SkipPatternReload {
        self.store.reload_skip_patterns().await
    }
}

/// 校验除数：去空白后必须是正整数
pub fn validate_division_factor(raw: &str) -> ApiResult<u32> {
    let trimmed = raw.trim();
    let parsed: i64 = trimmed
        .parse()
        .map_err(|_| ApiError::ValidationError(format!("除数必须是正整数: {:?}", raw)))?;

    if parsed <= 0 {
        return Err(ApiError::ValidationError(format!(
            "除数必须大于 0: {}",
            parsed
        )));
    }

    u32::try_from(parsed)
        .map_err(|_| ApiError::ValidationError(format!("除数超出范围: {}", parsed)))
}
