// ==========================================
// IMP 批次导入服务 - 领域类型定义
// ==========================================
// 职责: 运行号键、字段分隔符与各项硬约束常量
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 常量定义
// ==========================================

/// 批次文件字段分隔符（字段内不做转义）
pub const FIELD_SEPARATOR: char = ';';

/// 单个运行号允许的最大成员数
pub const RUN_CAPACITY: usize = 999;

/// 派生运行号上限
pub const DERIVED_RUN_CAP: i64 = 50;

/// 除数默认值（设置缺失或非法时使用）
pub const DEFAULT_DIVISION_FACTOR: u32 = 4;

/// 跳过模式默认值
pub const DEFAULT_SKIP_PATTERN: &str = "-VKa";

/// 非数字派生值的文本形式
pub const UNDEFINED_RUN_TEXT: &str = "NaN";

// ==========================================
// 运行号键 (Run Key)
// ==========================================
// 尾字段为非数字时派生值不可定义，作为独立分桶参与统计，
// 但不参与拆分与重编号。
// 排序: 所有数字键在前（升序），Undefined 在最后
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RunKey {
    Id(i64),
    Undefined,
}

impl RunKey {
    /// 数字运行号（Undefined 返回 None）
    pub fn id(&self) -> Option<i64> {
        match self {
            RunKey::Id(id) => Some(*id),
            RunKey::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, RunKey::Undefined)
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKey::Id(id) => write!(f, "{}", id),
            RunKey::Undefined => write!(f, "{}", UNDEFINED_RUN_TEXT),
        }
    }
}

// ==========================================
// 除数来源 (Division Factor Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorSource {
    Settings,       // 来自设置文件
    DefaultMissing, // 设置文件不可读，使用默认值
    DefaultInvalid, // 设置值非法，使用默认值
}

impl fmt::Display for FactorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorSource::Settings => write!(f, "SETTINGS"),
            FactorSource::DefaultMissing => write!(f, "DEFAULT_MISSING"),
            FactorSource::DefaultInvalid => write!(f, "DEFAULT_INVALID"),
        }
    }
}

/// 一次除数解析的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionFactor {
    pub value: u32,
    pub source: FactorSource,
}

impl DivisionFactor {
    pub fn from_settings(value: u32) -> Self {
        Self {
            value,
            source: FactorSource::Settings,
        }
    }

    pub fn default_with(source: FactorSource) -> Self {
        Self {
            value: DEFAULT_DIVISION_FACTOR,
            source,
        }
    }

    /// 是否回退到了默认值
    pub fn is_default(&self) -> bool {
        self.source != FactorSource::Settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_key_ordering() {
        let mut keys = vec![RunKey::Undefined, RunKey::Id(12), RunKey::Id(-1), RunKey::Id(3)];
        keys.sort();
        assert_eq!(
            keys,
            vec![RunKey::Id(-1), RunKey::Id(3), RunKey::Id(12), RunKey::Undefined]
        );
    }

    #[test]
    fn test_run_key_display() {
        assert_eq!(RunKey::Id(10).to_string(), "10");
        assert_eq!(RunKey::Undefined.to_string(), "NaN");
    }

    #[test]
    fn test_division_factor_default_flag() {
        assert!(!DivisionFactor::from_settings(7).is_default());
        let fallback = DivisionFactor::default_with(FactorSource::DefaultInvalid);
        assert!(fallback.is_default());
        assert_eq!(fallback.value, DEFAULT_DIVISION_FACTOR);
    }
}
