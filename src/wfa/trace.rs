//! WFA 轨迹模块
//!
//! 每处理一条语句就追加一份完整的 DP 值快照与空配置代价累计值，
//! 用于反向重建离线最优的索引调度。重分区边界不记录前驱，
//! 重建因此只能回溯到最近一次重分区。

use crate::wfa::work_values::TotalWorkValues;

#[derive(Debug, Clone)]
pub struct TraceEntry {
    /// 本条语句处理后的 DP 值快照
    pub values: TotalWorkValues,
    /// 截至本条语句的空配置代价累计
    pub null_cost_total: f64,
}

/// 追加式的 DP 快照历史
#[derive(Debug, Clone)]
pub struct WfaTrace {
    entries: Vec<TraceEntry>,
    null_cost_total: f64,
}

impl WfaTrace {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            null_cost_total: 0.0,
        }
    }

    /// 追加一条语句处理后的快照
    pub fn add_entry(&mut self, values: &TotalWorkValues, null_cost: f64) {
        self.null_cost_total += null_cost;
        self.entries.push(TraceEntry {
            values: values.clone(),
            null_cost_total: self.null_cost_total,
        });
    }

    /// 自最近一次重分区以来记录的语句数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, at: usize) -> &TraceEntry {
        &self.entries[at]
    }

    /// 空配置代价累计（全历史，不随重分区清零）
    pub fn null_cost_total(&self) -> f64 {
        self.null_cost_total
    }

    /// 重分区边界：丢弃无法跨越的历史
    pub fn truncate_at_boundary(&mut self) {
        self.entries.clear();
    }
}

impl Default for WfaTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::StaticIndexSet;
    use crate::core::Index;
    use crate::partition::IndexPartitions;
    use std::sync::Arc;

    fn one_subset_partitions() -> IndexPartitions {
        let index = Arc::new(Index::new(
            0,
            "idx_0".to_string(),
            "orders".to_string(),
            vec!["col_0".to_string()],
            10.0,
        ));
        IndexPartitions::singletons(&StaticIndexSet::new(vec![index]), 64)
    }

    #[test]
    fn test_null_cost_accumulates() {
        let partitions = one_subset_partitions();
        let wf = TotalWorkValues::new(&partitions);
        let mut trace = WfaTrace::new();

        trace.add_entry(&wf, 5.0);
        trace.add_entry(&wf, 3.0);
        assert_eq!(trace.len(), 2);
        assert!((trace.entry(0).null_cost_total - 5.0).abs() < 1e-9);
        assert!((trace.entry(1).null_cost_total - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_clears_entries_keeps_total() {
        let partitions = one_subset_partitions();
        let wf = TotalWorkValues::new(&partitions);
        let mut trace = WfaTrace::new();

        trace.add_entry(&wf, 5.0);
        trace.truncate_at_boundary();
        assert!(trace.is_empty());
        assert!((trace.null_cost_total() - 5.0).abs() < 1e-9);
    }
}
