// ==========================================
// IMP 批次导入服务 - 设置读取 Trait
// ==========================================
// 职责: 定义流水线所需的设置读取接口（不包含实现）
// 红线: 不包含设置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::DivisionFactor;
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// SettingsReader Trait
// ==========================================
// 用途: 流水线每个批次读取除数与跳过模式
// 实现者: ConfigStore（读取设置文件）
#[async_trait]
pub trait SettingsReader: Send + Sync {
    /// 获取除数
    ///
    /// # 返回
    /// - DivisionFactor: 当前生效的除数及其来源
    ///
    /// # 说明
    /// - 每个批次开始时重新读取，不跨批次缓存
    /// - 设置缺失、非数字或非正数 → 默认值 4（带告警），不中断批次
    async fn get_division_factor(&self) -> DivisionFactor;

    /// 获取当前生效的跳过模式列表
    ///
    /// # 返回
    /// - 非空列表（默认 ["-VKa"]）
    async fn get_skip_patterns(&self) -> Arc<Vec<String>>;
}
