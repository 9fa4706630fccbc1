// ==========================================
// IMP 批次导入服务 - 快照领域模型
// ==========================================
// 职责: 对外推送/轮询的 {id, value} 列表
// ==========================================

use serde::{Deserialize, Serialize};

/// 快照条目上限
pub const SNAPSHOT_CAPACITY: usize = 5000;

/// 快照条目 id 截取的字符数
pub const SNAPSHOT_ID_CHARS: usize = 12;

/// 快照条目 id 所在字段下标
pub const SNAPSHOT_ID_FIELD: usize = 8;

/// 无数据标记（与现有前端约定保持一致）
pub const NO_DATA_MESSAGE: &str = "NO DIMTER FILER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub value: String,
}

/// 快照：条目列表或"无数据"标记
///
/// 序列化形态：`{"entries": [...]}` 或 `{"message": "NO DIMTER FILER"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Snapshot {
    Entries { entries: Vec<SnapshotEntry> },
    NoData { message: String },
}

impl Snapshot {
    pub fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        Snapshot::Entries { entries }
    }

    pub fn no_data() -> Self {
        Snapshot::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn entries(&self) -> Option<&[SnapshotEntry]> {
        match self {
            Snapshot::Entries { entries } => Some(entries),
            Snapshot::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Snapshot::NoData { .. })
    }

    pub fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Snapshot {
    /// 启动后、首次加载前的状态：空列表
    fn default() -> Self {
        Snapshot::Entries {
            entries: Vec::new(),
        }
    }
}
