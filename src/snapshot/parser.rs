// ==========================================
// IMP 批次导入服务 - 快照解析
// ==========================================

use crate::domain::snapshot::{
    Snapshot, SnapshotEntry, SNAPSHOT_CAPACITY, SNAPSHOT_ID_CHARS, SNAPSHOT_ID_FIELD,
};
use crate::domain::types::FIELD_SEPARATOR;

/// 解析规范缓存文件内容
///
/// 规则：
/// - 忽略空白行
/// - 字段数 < 9 的行丢弃
/// - id = 第 8 号字段的前 12 个字符，value = 尾字段去空白
/// - 按文件顺序最多保留 5000 条
pub fn parse_snapshot(content: &str) -> Snapshot {
    let entries = content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_entry)
        .take(SNAPSHOT_CAPACITY)
        .collect();
    Snapshot::from_entries(entries)
}

fn parse_entry(line: &str) -> Option<SnapshotEntry> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() <= SNAPSHOT_ID_FIELD {
        return None;
    }
    let id: String = fields[SNAPSHOT_ID_FIELD].chars().take(SNAPSHOT_ID_CHARS).collect();
    let value = fields.last().map(|v| v.trim()).unwrap_or_default();
    Some(SnapshotEntry {
        id,
        value: value.to_string(),
    })
}
