// ==========================================
// IMP 批次导入服务 - 运行号产能拆分引擎
// ==========================================
// 红线: 单个运行号成员数 ≤ 999；记录顺序永不改变
// ==========================================
// 职责: 统计运行号分布，反复拆分超限运行号并重编号
// 输入: 合格记录的运行号序列（文件顺序）
// 输出: 重编号后的运行号序列 + 初始/最终分布 + 拆分记录
// ==========================================

use crate::domain::batch::{RunTally, SplitStep};
use crate::domain::types::{RunKey, RUN_CAPACITY};
use std::collections::BTreeMap;
use tracing::instrument;

/// 拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceOutcome {
    /// 重编号后的运行号（与输入一一对应）
    pub keys: Vec<RunKey>,
    /// 初始分布（升序）
    pub initial: Vec<RunTally>,
    /// 最终分布（升序）
    pub final_runs: Vec<RunTally>,
    /// 按执行顺序的拆分记录
    pub splits: Vec<SplitStep>,
}

// ==========================================
// RunBalancer - 运行号拆分引擎
// ==========================================
pub struct RunBalancer {
    capacity: usize,
}

impl RunBalancer {
    /// 使用默认产能上限（999）
    pub fn new() -> Self {
        Self {
            capacity: RUN_CAPACITY,
        }
    }

    /// 指定产能上限（最小为 1）
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 统计运行号分布
    pub fn tally(keys: &[RunKey]) -> BTreeMap<RunKey, usize> {
        let mut counts = BTreeMap::new();
        for key in keys {
            *counts.entry(*key).or_insert(0) += 1;
        }
        counts
    }

    /// 拆分至所有运行号成员数 ≤ capacity
    ///
    /// 规则：
    /// 1) 升序找到第一个超限运行号 R
    /// 2) 所有 > R 的运行号整体 +1
    /// 3) R 的成员按文件顺序，前 floor(n/2) 个保留 R，其余改为 R+1
    /// 4) 重复直到没有超限运行号
    ///
    /// Undefined 分桶只统计，不拆分。
    #[instrument(skip(self, keys), fields(records = keys.len(), capacity = self.capacity))]
    pub fn balance(&self, keys: &[RunKey]) -> BalanceOutcome {
        let mut current: Vec<RunKey> = keys.to_vec();
        let mut counts = Self::tally(&current);
        let initial = to_tallies(&counts);
        let mut splits = Vec::new();

        while let Some((run, count)) = first_overflowing(&counts, self.capacity) {
            let half = count / 2;
            tracing::debug!(run, count, kept = half, moved = count - half, "拆分超限运行号");

            counts = shift_and_split(&counts, run, count, half);
            relabel(&mut current, run, half);

            splits.push(SplitStep {
                run,
                before: count,
                kept: half,
                moved: count - half,
            });
        }

        BalanceOutcome {
            keys: current,
            initial,
            final_runs: to_tallies(&counts),
            splits,
        }
    }
}

impl Default for RunBalancer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 纯函数辅助
// ==========================================

fn to_tallies(counts: &BTreeMap<RunKey, usize>) -> Vec<RunTally> {
    counts
        .iter()
        .map(|(run, count)| RunTally {
            run: *run,
            count: *count,
        })
        .collect()
}

/// 升序第一个超限的数字运行号
fn first_overflowing(counts: &BTreeMap<RunKey, usize>, capacity: usize) -> Option<(i64, usize)> {
    counts
        .iter()
        .find_map(|(key, count)| match key {
            RunKey::Id(id) if *count > capacity => Some((*id, *count)),
            _ => None,
        })
}

/// 在分布快照上执行平移与拆分，返回新分布
///
/// 基于旧分布构造新分布，平移顺序不影响结果。
fn shift_and_split(
    counts: &BTreeMap<RunKey, usize>,
    run: i64,
    count: usize,
    half: usize,
) -> BTreeMap<RunKey, usize> {
    let mut next = BTreeMap::new();
    for (key, c) in counts {
        match key {
            RunKey::Id(id) if *id > run => {
                next.insert(RunKey::Id(id + 1), *c);
            }
            RunKey::Id(id) if *id == run => {}
            other => {
                next.insert(*other, *c);
            }
        }
    }
    next.insert(RunKey::Id(run), half);
    next.insert(RunKey::Id(run + 1), count - half);
    next
}

/// 按文件顺序回写一次拆分
fn relabel(keys: &mut [RunKey], run: i64, half: usize) {
    let mut seen = 0usize;
    for key in keys.iter_mut() {
        if let RunKey::Id(id) = *key {
            if id > run {
                *key = RunKey::Id(id + 1);
            } else if id == run {
                seen += 1;
                if seen > half {
                    *key = RunKey::Id(run + 1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[i64]) -> Vec<RunKey> {
        values.iter().map(|v| RunKey::Id(*v)).collect()
    }

    #[test]
    fn test_no_split_when_within_capacity() {
        let balancer = RunBalancer::new();
        let keys = ids(&[10]);

        let outcome = balancer.balance(&keys);

        assert_eq!(outcome.keys, keys);
        assert!(outcome.splits.is_empty());
        assert_eq!(
            outcome.final_runs,
            vec![RunTally {
                run: RunKey::Id(10),
                count: 1
            }]
        );
    }

    #[test]
    fn test_empty_batch_has_zero_runs() {
        let outcome = RunBalancer::new().balance(&[]);
        assert!(outcome.keys.is_empty());
        assert!(outcome.initial.is_empty());
        assert!(outcome.final_runs.is_empty());
        assert!(outcome.splits.is_empty());
    }

    #[test]
    fn test_small_capacity_split_and_shift() {
        // 容量 2：运行号 1 有 5 条，运行号 2 有 1 条
        let balancer = RunBalancer::with_capacity(2);
        let keys = ids(&[1, 1, 2, 1, 1, 1]);

        let outcome = balancer.balance(&keys);

        // 第一次拆分: 1 → {1:2, 2:3}, 原 2 → 3
        // 第二次拆分: 2(3 条) → {2:1, 3:2}, 原 3 → 4
        assert_eq!(outcome.keys, ids(&[1, 1, 4, 2, 3, 3]));
        assert_eq!(outcome.splits.len(), 2);
        assert_eq!(
            outcome.splits[0],
            SplitStep {
                run: 1,
                before: 5,
                kept: 2,
                moved: 3
            }
        );
        assert_eq!(
            outcome.splits[1],
            SplitStep {
                run: 2,
                before: 3,
                kept: 1,
                moved: 2
            }
        );

        for tally in &outcome.final_runs {
            assert!(tally.count <= 2);
        }
        let total: usize = outcome.final_runs.iter().map(|t| t.count).sum();
        assert_eq!(total, keys.len());
    }

    #[test]
    fn test_undefined_bucket_is_tallied_but_never_split() {
        let balancer = RunBalancer::with_capacity(1);
        let keys = vec![RunKey::Undefined, RunKey::Undefined, RunKey::Id(3)];

        let outcome = balancer.balance(&keys);

        assert_eq!(outcome.keys, keys);
        assert_eq!(
            outcome.final_runs,
            vec![
                RunTally {
                    run: RunKey::Id(3),
                    count: 1
                },
                RunTally {
                    run: RunKey::Undefined,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_tally_counts_each_key() {
        let counts = RunBalancer::tally(&ids(&[3, 1, 3, 3]));
        assert_eq!(counts.get(&RunKey::Id(3)), Some(&3));
        assert_eq!(counts.get(&RunKey::Id(1)), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_with_capacity_floor_is_one() {
        assert_eq!(RunBalancer::with_capacity(0).capacity(), 1);
    }
}
