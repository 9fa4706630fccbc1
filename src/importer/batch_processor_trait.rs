// ==========================================
// IMP 批次导入服务 - 批次处理 Trait
// ==========================================
// 职责: 定义单个批次的处理接口（不包含实现）
// ==========================================

use crate::domain::batch::BatchOutcome;
use crate::importer::error::IngestResult;
use async_trait::async_trait;

// ==========================================
// BatchProcessor Trait
// ==========================================
// 用途: 监听分发器调用的批次处理入口
// 实现者: BatchPipeline
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    /// 处理待处理目录中的一个批次文件
    ///
    /// # 参数
    /// - filename: 文件名（即批次标识）
    ///
    /// # 返回
    /// - Ok(BatchOutcome): 已处理 / 已跳过 / 已消失
    /// - Err: 读取或解码失败（源文件保留在待处理目录）
    ///
    /// # 处理流程
    /// 1. 读取源文件（不存在 → Vanished）
    /// 2. 首行匹配跳过模式（命中 → 原样归档）
    /// 3. 读取除数并派生运行号
    /// 4. 运行号拆分
    /// 5. 落盘（缓存 / 归档 / 删除源文件）
    async fn process(&self, filename: &str) -> IngestResult<BatchOutcome>;
}
