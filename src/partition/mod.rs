//! 索引分区模块
//!
//! 把热集切分为互不相交的子集，使交互的索引共享状态空间、无关的
//! 索引彼此隔离。每个子集的状态数为 2^|子集|，全部子集的状态总数
//! 受配置上限约束，这是对指数爆炸的硬性兜底。

use log::warn;
use std::sync::Arc;

use crate::candidate::StaticIndexSet;
use crate::core::error::PartitionError;
use crate::core::{BitSet, Index, IndexId};
use crate::stats::DoiFunction;

/// 分区内的一个子集
///
/// 成员按全局编号升序排列，排列位置即本地位号
#[derive(Debug, Clone)]
pub struct Subset {
    indexes: Vec<Arc<Index>>,
    bit: BitSet,
}

impl Subset {
    fn singleton(index: Arc<Index>) -> Self {
        Self::from_indexes(vec![index])
    }

    /// 由成员列表构造，按全局编号升序去重
    pub fn from_indexes(mut indexes: Vec<Arc<Index>>) -> Self {
        indexes.sort_by_key(|i| i.id);
        indexes.dedup_by_key(|i| i.id);
        let bit = indexes.iter().map(|i| i.id).collect();
        Self { indexes, bit }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// 子集的状态数：2^|子集|
    pub fn state_count(&self) -> usize {
        1usize << self.indexes.len()
    }

    pub fn contains(&self, id: IndexId) -> bool {
        self.bit.contains(id)
    }

    /// 成员在本子集内的本地位号
    pub fn local_position(&self, id: IndexId) -> Option<usize> {
        self.indexes.binary_search_by_key(&id, |i| i.id).ok()
    }

    pub fn index_at(&self, position: usize) -> &Arc<Index> {
        &self.indexes[position]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Index>> {
        self.indexes.iter()
    }

    pub fn bits(&self) -> &BitSet {
        &self.bit
    }

    /// 是否与另一子集有公共成员
    pub fn overlaps(&self, other: &Subset) -> bool {
        self.bit.intersects(&other.bit)
    }

    /// 把以全局位向量表达的配置投影为本地状态编码
    ///
    /// 不属于本子集的索引不产生任何贡献
    pub fn project_state(&self, config: &BitSet) -> usize {
        let mut state = 0usize;
        for (position, index) in self.indexes.iter().enumerate() {
            if config.contains(index.id) {
                state |= 1 << position;
            }
        }
        state
    }

    /// 把本地状态编码展开进全局位向量
    pub fn expand_state(&self, state: usize, out: &mut BitSet) {
        for (position, index) in self.indexes.iter().enumerate() {
            if state & (1 << position) != 0 {
                out.insert(index.id);
            }
        }
    }

    fn average_id(&self) -> f64 {
        if self.indexes.is_empty() {
            return 0.0;
        }
        let sum: usize = self.indexes.iter().map(|i| i.id).sum();
        sum as f64 / self.indexes.len() as f64
    }

    fn min_id(&self) -> IndexId {
        self.indexes.first().map(|i| i.id).unwrap_or(0)
    }
}

impl PartialEq for Subset {
    fn eq(&self, other: &Self) -> bool {
        self.bit == other.bit
    }
}

impl Eq for Subset {}

/// 热集的分区：互不相交的子集族，其并恰为热集
#[derive(Debug, Clone)]
pub struct IndexPartitions {
    subsets: Vec<Subset>,
    state_limit: usize,
    total_states: usize,
}

impl IndexPartitions {
    /// 每个热集成员一个单元素子集
    pub fn singletons(hot_set: &StaticIndexSet, state_limit: usize) -> Self {
        let subsets: Vec<Subset> = hot_set
            .iter()
            .map(|index| Subset::singleton(index.clone()))
            .collect();
        let total_states = subsets.iter().map(|s| s.state_count()).sum();
        let mut partitions = Self {
            subsets,
            state_limit,
            total_states,
        };
        partitions.resort();
        partitions
    }

    /// 由成员位向量重建分区，用于结构相等性校验
    pub fn from_subsets(groups: Vec<Vec<Arc<Index>>>, state_limit: usize) -> Self {
        let subsets: Vec<Subset> = groups
            .into_iter()
            .filter(|g| !g.is_empty())
            .map(Subset::from_indexes)
            .collect();
        let total_states = subsets.iter().map(|s| s.state_count()).sum();
        let mut partitions = Self {
            subsets,
            state_limit,
            total_states,
        };
        partitions.resort();
        partitions
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    pub fn subset(&self, position: usize) -> &Subset {
        &self.subsets[position]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subset> {
        self.subsets.iter()
    }

    /// 全部子集的状态总数
    pub fn total_state_count(&self) -> usize {
        self.total_states
    }

    pub fn state_limit(&self) -> usize {
        self.state_limit
    }

    /// 包含指定索引的子集位置
    pub fn subset_containing(&self, id: IndexId) -> Option<usize> {
        self.subsets.iter().position(|s| s.contains(id))
    }

    /// 合并两个子集
    ///
    /// 合并后的子集成员按全局编号升序重新分配本地位号。若合并导致
    /// 状态总数超过上限则拒绝，分区保持原样。
    pub fn merge(&mut self, a: usize, b: usize) -> Result<usize, PartitionError> {
        if a >= self.subsets.len() {
            return Err(PartitionError::SubsetOutOfRange(a));
        }
        if b >= self.subsets.len() {
            return Err(PartitionError::SubsetOutOfRange(b));
        }
        if a == b {
            return Ok(a);
        }

        let merged_states = 1usize << (self.subsets[a].len() + self.subsets[b].len());
        let new_total = self.total_states - self.subsets[a].state_count()
            - self.subsets[b].state_count()
            + merged_states;
        if new_total > self.state_limit {
            return Err(PartitionError::StateLimitExceeded {
                required: new_total,
                limit: self.state_limit,
            });
        }

        let second = self.subsets.remove(a.max(b));
        let first = self.subsets.remove(a.min(b));
        let mut members = first.indexes;
        members.extend(second.indexes);
        let merged = Subset::from_indexes(members);

        // 按 (平均成员编号, 最小成员编号) 的排序键插入到确定位置
        let position = self.subsets.partition_point(|s| {
            match s.average_id().total_cmp(&merged.average_id()) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => s.min_id() < merged.min_id(),
                std::cmp::Ordering::Greater => false,
            }
        });
        self.subsets.insert(position, merged);
        self.total_states = new_total;
        Ok(position)
    }

    // 子集按 (平均成员编号, 最小成员编号) 排序，保证确定性的摆放
    fn resort(&mut self) {
        self.subsets.sort_by(|x, y| {
            x.average_id()
                .total_cmp(&y.average_id())
                .then_with(|| x.min_id().cmp(&y.min_id()))
        });
    }
}

impl PartialEq for IndexPartitions {
    fn eq(&self, other: &Self) -> bool {
        self.subsets == other.subsets
    }
}

impl Eq for IndexPartitions {}

/// 两个子集之间的交互度：跨子集成员对交互度的最大值
fn subset_degree(a: &Subset, b: &Subset, doi_fn: &dyn DoiFunction) -> f64 {
    let mut degree = 0.0f64;
    for x in a.iter() {
        for y in b.iter() {
            let d = doi_fn.degree(x.id, y.id);
            if d > degree {
                degree = d;
            }
        }
    }
    degree
}

/// 依据交互度构造分区
///
/// 从单元素子集出发，反复合并交互度最高且超过阈值的子集对；
/// 状态预算不允许的合并被跳过，相应子集保持分离。
pub fn choose_partitions(
    hot_set: &StaticIndexSet,
    doi_fn: &dyn DoiFunction,
    threshold: f64,
    state_limit: usize,
) -> IndexPartitions {
    let mut partitions = IndexPartitions::singletons(hot_set, state_limit);

    loop {
        // 收集仍有交互的子集对，按交互度从高到低尝试
        let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
        for i in 0..partitions.subset_count() {
            for j in (i + 1)..partitions.subset_count() {
                let degree = subset_degree(partitions.subset(i), partitions.subset(j), doi_fn);
                if degree > threshold {
                    pairs.push((i, j, degree));
                }
            }
        }
        pairs.sort_by(|x, y| y.2.total_cmp(&x.2));

        let mut merged_any = false;
        for (i, j, degree) in pairs {
            match partitions.merge(i, j) {
                Ok(_) => {
                    merged_any = true;
                    break;
                }
                Err(PartitionError::StateLimitExceeded { required, limit }) => {
                    warn!(
                        "放弃交互度 {:.3} 的子集合并: 需要 {} 个状态, 上限 {}",
                        degree, required, limit
                    );
                }
                Err(_) => {}
            }
        }
        if !merged_any {
            break;
        }
    }

    partitions
}
