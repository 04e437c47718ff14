//! 索引集合模块
//!
//! 提供两类以位向量为底座的索引集合：
//! - `StaticIndexSet`：固定集合，热集重组时整体替换
//! - `DynamicIndexSet`：可变集合，用于物化集与用户强制集

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{BitSet, Index, IndexId};

/// 固定索引集合，构造后不再变动
#[derive(Debug, Clone, Default)]
pub struct StaticIndexSet {
    indexes: Vec<Arc<Index>>,
    bit: BitSet,
}

impl StaticIndexSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由索引列表构造，按编号升序去重
    pub fn new(mut indexes: Vec<Arc<Index>>) -> Self {
        indexes.sort_by_key(|i| i.id);
        indexes.dedup_by_key(|i| i.id);
        let bit = indexes.iter().map(|i| i.id).collect();
        Self { indexes, bit }
    }

    pub fn contains(&self, id: IndexId) -> bool {
        self.bit.contains(id)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn bits(&self) -> &BitSet {
        &self.bit
    }

    /// 按编号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Index>> {
        self.indexes.iter()
    }

    pub fn get(&self, id: IndexId) -> Option<&Arc<Index>> {
        self.indexes
            .binary_search_by_key(&id, |i| i.id)
            .ok()
            .map(|pos| &self.indexes[pos])
    }
}

impl PartialEq for StaticIndexSet {
    fn eq(&self, other: &Self) -> bool {
        self.bit == other.bit
    }
}

impl Eq for StaticIndexSet {}

/// 可变索引集合
#[derive(Debug, Clone, Default)]
pub struct DynamicIndexSet {
    indexes: HashMap<IndexId, Arc<Index>>,
    bit: BitSet,
}

impl DynamicIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入索引，已存在时返回 false
    pub fn insert(&mut self, index: Arc<Index>) -> bool {
        if self.bit.contains(index.id) {
            return false;
        }
        self.bit.insert(index.id);
        self.indexes.insert(index.id, index);
        true
    }

    /// 移除索引，返回被移除的元素
    pub fn remove(&mut self, id: IndexId) -> Option<Arc<Index>> {
        self.bit.remove(id);
        self.indexes.remove(&id)
    }

    pub fn contains(&self, id: IndexId) -> bool {
        self.bit.contains(id)
    }

    pub fn get(&self, id: IndexId) -> Option<&Arc<Index>> {
        self.indexes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn bits(&self) -> &BitSet {
        &self.bit
    }

    /// 按编号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Index>> + '_ {
        self.bit.iter().filter_map(move |id| self.indexes.get(&id))
    }
}
