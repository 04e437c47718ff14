//! 负载统计模块
//!
//! 维护每个候选索引的收益窗口与每个无序索引对的交互度窗口，
//! 并以当前物化配置下的实际执行代价推进虚拟时钟。

use std::collections::HashMap;

use crate::candidate::{DynamicIndexSet, PoolSnapshot};
use crate::core::{BitSet, Index, IndexId};
use crate::oracle::ProfiledQuery;
use crate::stats::window::MeasurementWindow;
use crate::stats::{BenefitFunction, DoiFunction};

/// 无序对的规范化键
fn pair_key(a: IndexId, b: IndexId) -> (IndexId, IndexId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// 负载统计器
#[derive(Debug)]
pub struct WorkloadStatistics {
    window_size: usize,
    current_time: f64,
    benefit_windows: HashMap<IndexId, MeasurementWindow>,
    interaction_windows: HashMap<(IndexId, IndexId), MeasurementWindow>,
}

impl WorkloadStatistics {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            current_time: 0.0,
            benefit_windows: HashMap::new(),
            interaction_windows: HashMap::new(),
        }
    }

    /// 虚拟时钟当前读数
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// 录入一条已剖析语句
    ///
    /// 先按当前时刻记录各候选的净收益与各索引对的交互度，
    /// 再以该语句在当前物化配置下的实际代价推进虚拟时钟。
    pub fn add_query(
        &mut self,
        query: &dyn ProfiledQuery,
        candidates: &PoolSnapshot,
        materialized: &DynamicIndexSet,
    ) {
        let now = self.current_time;
        let window_size = self.window_size;

        for index in candidates.iter() {
            let measurement = query.best_benefit(index) - query.maintenance_cost(index);
            if measurement != 0.0 {
                self.benefit_windows
                    .entry(index.id)
                    .or_insert_with(|| MeasurementWindow::new(window_size))
                    .record(measurement, now);
            }
        }

        for a in candidates.iter() {
            for b in candidates.iter().filter(|b| b.id > a.id) {
                let degree = query.interaction(a.id, b.id);
                if degree != 0.0 {
                    self.interaction_windows
                        .entry(pair_key(a.id, b.id))
                        .or_insert_with(|| MeasurementWindow::new(window_size))
                        .record(degree, now);
                }
            }
        }

        self.current_time += query.cost(materialized.bits());
    }

    /// 某个索引当前的收益估计
    pub fn observed_benefit(&self, id: IndexId) -> f64 {
        self.benefit_windows
            .get(&id)
            .map(|w| w.max_rate(self.current_time))
            .unwrap_or(0.0)
    }

    /// 某个无序索引对当前的交互度估计
    pub fn observed_doi(&self, a: IndexId, b: IndexId) -> f64 {
        self.interaction_windows
            .get(&pair_key(a, b))
            .map(|w| w.max_rate(self.current_time))
            .unwrap_or(0.0)
    }
}

impl BenefitFunction for WorkloadStatistics {
    fn benefit(&self, index: &Index, _selected: &BitSet) -> f64 {
        self.observed_benefit(index.id)
    }
}

impl DoiFunction for WorkloadStatistics {
    fn degree(&self, a: IndexId, b: IndexId) -> f64 {
        self.observed_doi(a, b)
    }
}
