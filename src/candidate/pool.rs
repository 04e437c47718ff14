//! 候选池模块
//!
//! 为工作负载中出现过的每一个候选索引分配永久编号：
//! - 追加式 arena，编号即数组下标，永不回收或重排
//! - 同一性去重：同表同列的候选只登记一次
//! - 快照只记录当时的 arena 前缀与位图，池继续增长也始终有效

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{BitSet, Index, IndexDef, IndexId};

/// 候选索引注册表
#[derive(Debug, Default)]
pub struct CandidatePool {
    entries: Vec<Arc<Index>>,
    by_key: HashMap<(String, Vec<String>), IndexId>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记候选索引，返回其永久编号
    ///
    /// 已登记过的候选（同一性判断）直接返回原编号，不重复分配
    pub fn add_index(&mut self, def: &IndexDef) -> IndexId {
        let key = def.identity_key();
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.entries.len();
        let index = Arc::new(Index::new(
            id,
            def.name.clone(),
            def.table.clone(),
            def.columns.clone(),
            def.creation_cost,
        ));
        self.entries.push(index);
        self.by_key.insert(key, id);
        debug!("候选池新增索引 #{} ({})", id, def.name);
        id
    }

    pub fn get(&self, id: IndexId) -> Option<&Arc<Index>> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 取当前时刻的不可变快照
    pub fn snapshot(&self) -> PoolSnapshot {
        let mut bitmap = BitSet::with_capacity(self.entries.len());
        for id in 0..self.entries.len() {
            bitmap.insert(id);
        }
        PoolSnapshot {
            entries: self.entries.clone(),
            bitmap,
        }
    }
}

/// 候选池快照：拍摄时刻的 arena 前缀
///
/// arena 只增不减，快照在池继续增长后依然有效
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    entries: Vec<Arc<Index>>,
    bitmap: BitSet,
}

impl PoolSnapshot {
    /// 快照内最大编号，空快照为 None
    pub fn max_id(&self) -> Option<IndexId> {
        self.entries.len().checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: IndexId) -> bool {
        self.bitmap.contains(id)
    }

    pub fn get(&self, id: IndexId) -> Option<&Arc<Index>> {
        self.entries.get(id)
    }

    pub fn bitmap(&self) -> &BitSet {
        &self.bitmap
    }

    /// 按编号升序遍历快照内的候选
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Index>> {
        self.entries.iter()
    }
}
