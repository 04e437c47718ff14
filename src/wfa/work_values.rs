//! DP 值表模块
//!
//! 工作函数算法的代价表。全部子集的 (值, 前驱) 连续平铺在同一对
//! 缓冲区中，`offsets[i]` 给出子集 i 的起始下标，状态编码即块内偏移。

use crate::partition::IndexPartitions;

/// 分区全体子集的工作函数值表
#[derive(Debug, Clone, PartialEq)]
pub struct TotalWorkValues {
    values: Vec<f64>,
    predecessors: Vec<usize>,
    offsets: Vec<usize>,
}

impl TotalWorkValues {
    /// 为给定分区分配全零值表
    pub fn new(partitions: &IndexPartitions) -> Self {
        let mut offsets = Vec::with_capacity(partitions.subset_count());
        let mut total = 0;
        for subset in partitions.iter() {
            offsets.push(total);
            total += subset.state_count();
        }
        Self {
            values: vec![0.0; total],
            predecessors: vec![0; total],
            offsets,
        }
    }

    /// 重整形状以适配新分区，复用既有缓冲，内容清零
    pub fn reshape(&mut self, partitions: &IndexPartitions) {
        self.offsets.clear();
        let mut total = 0;
        for subset in partitions.iter() {
            self.offsets.push(total);
            total += subset.state_count();
        }
        self.values.clear();
        self.values.resize(total, 0.0);
        self.predecessors.clear();
        self.predecessors.resize(total, 0);
    }

    pub fn subset_count(&self) -> usize {
        self.offsets.len()
    }

    /// 状态总数
    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, subset: usize, state: usize) -> f64 {
        self.values[self.offsets[subset] + state]
    }

    pub fn predecessor(&self, subset: usize, state: usize) -> usize {
        self.predecessors[self.offsets[subset] + state]
    }

    pub fn set(&mut self, subset: usize, state: usize, value: f64, predecessor: usize) {
        let at = self.offsets[subset] + state;
        self.values[at] = value;
        self.predecessors[at] = predecessor;
    }

    pub fn set_value(&mut self, subset: usize, state: usize, value: f64) {
        self.values[self.offsets[subset] + state] = value;
    }
}
