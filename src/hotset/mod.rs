//! 热集选择模块
//!
//! 从候选池中选出受 DP 引擎监控的有界索引集合（热集）：
//! - 必选集之外的候选按 收益 - 切换惩罚 打分
//! - 已在热集中的候选没有切换惩罚，新候选的惩罚为其创建代价
//! - 提供一次性打分与贪心两种选择方式

use std::sync::Arc;

use crate::candidate::{DynamicIndexSet, PoolSnapshot, StaticIndexSet};
use crate::core::{BitSet, Index};
use crate::stats::BenefitFunction;

/// 有界的最高分保留结构
///
/// 未满时全部收入；满后仅当分数严格高于当前最小分时替换之
struct TopScores {
    capacity: usize,
    entries: Vec<(f64, Arc<Index>)>,
}

impl TopScores {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    fn offer(&mut self, score: f64, index: &Arc<Index>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() < self.capacity {
            self.entries.push((score, index.clone()));
            return;
        }
        let mut min_pos = 0;
        for (pos, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.0 < self.entries[min_pos].0 {
                min_pos = pos;
            }
        }
        if score > self.entries[min_pos].0 {
            self.entries[min_pos] = (score, index.clone());
        }
    }

    fn into_indexes(self) -> Vec<Arc<Index>> {
        self.entries.into_iter().map(|(_, index)| index).collect()
    }
}

/// 选出新的热集
///
/// 容量扣除必选集后不剩名额时，结果就是必选集本身（可能超出
/// `max_size`，容量的自动扩张由调用方负责）。
pub fn choose_hot_set(
    candidates: &PoolSnapshot,
    old_hot_set: &StaticIndexSet,
    required: &DynamicIndexSet,
    benefit_fn: &dyn BenefitFunction,
    max_size: usize,
) -> StaticIndexSet {
    let num_to_choose = max_size.saturating_sub(required.len());
    if num_to_choose == 0 {
        return StaticIndexSet::new(required.iter().cloned().collect());
    }

    let empty = BitSet::new();
    let mut top = TopScores::new(num_to_choose);
    for index in candidates.iter() {
        if required.contains(index.id) {
            continue;
        }
        let penalty = if old_hot_set.contains(index.id) {
            0.0
        } else {
            index.creation_cost
        };
        top.offer(benefit_fn.benefit(index, &empty) - penalty, index);
    }

    let mut chosen: Vec<Arc<Index>> = required.iter().cloned().collect();
    chosen.extend(top.into_indexes());
    StaticIndexSet::new(chosen)
}

/// 贪心变体：逐个名额做线性扫描取最大值
///
/// 每一轮都把已选集合交给收益函数，支持上下文相关的打分
pub fn choose_hot_set_greedy(
    candidates: &PoolSnapshot,
    old_hot_set: &StaticIndexSet,
    required: &DynamicIndexSet,
    benefit_fn: &dyn BenefitFunction,
    max_size: usize,
) -> StaticIndexSet {
    let num_to_choose = max_size.saturating_sub(required.len());
    if num_to_choose == 0 {
        return StaticIndexSet::new(required.iter().cloned().collect());
    }

    let mut chosen: Vec<Arc<Index>> = required.iter().cloned().collect();
    let mut chosen_bits = required.bits().clone();
    for _ in 0..num_to_choose {
        let mut best: Option<(f64, &Arc<Index>)> = None;
        for index in candidates.iter() {
            if chosen_bits.contains(index.id) {
                continue;
            }
            let penalty = if old_hot_set.contains(index.id) {
                0.0
            } else {
                index.creation_cost
            };
            let score = benefit_fn.benefit(index, &chosen_bits) - penalty;
            let better = match best {
                None => true,
                Some((best_score, _)) => score > best_score,
            };
            if better {
                best = Some((score, index));
            }
        }
        match best {
            Some((_, index)) => {
                chosen_bits.insert(index.id);
                chosen.push(index.clone());
            }
            None => break,
        }
    }
    StaticIndexSet::new(chosen)
}
