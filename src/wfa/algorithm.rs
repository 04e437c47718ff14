//! 工作函数算法模块
//!
//! 度量任务系统的确定性在线算法，按子集独立运行：
//! - 每条语句对每个子集做一次 O(状态数²) 的工作函数松弛
//! - 懒惰策略选新推荐状态，平局次序不可改动（竞争比保证所系）
//! - 用户投票立即强制对应位并做单调修复
//! - 重分区时按投影近似迁移旧值，不跨边界记录前驱

use log::{debug, info, warn};
use std::sync::Arc;

use crate::core::error::PartitionError;
use crate::core::{AdvisorResult, BitSet, Index, IndexId};
use crate::oracle::ProfiledQuery;
use crate::partition::{IndexPartitions, Subset};
use crate::wfa::trace::WfaTrace;
use crate::wfa::work_values::TotalWorkValues;

/// 子集运行时：子集与其当前推荐状态
#[derive(Debug, Clone)]
pub struct SubMachine {
    subset: Subset,
    current_state: usize,
}

impl SubMachine {
    fn new(subset: Subset, current_state: usize) -> Self {
        Self {
            subset,
            current_state,
        }
    }

    pub fn subset(&self) -> &Subset {
        &self.subset
    }

    pub fn current_state(&self) -> usize {
        self.current_state
    }

    /// 状态间转移代价：新物化索引的创建代价之和，撤下免费
    fn transition_cost(subset: &Subset, from: usize, to: usize) -> f64 {
        let added = to & !from;
        let mut cost = 0.0;
        for position in 0..subset.len() {
            if added & (1 << position) != 0 {
                cost += subset.index_at(position).creation_cost;
            }
        }
        cost
    }
}

/// 工作函数算法引擎
#[derive(Debug)]
pub struct WorkFunctionAlgorithm {
    submachines: Vec<SubMachine>,
    wf: TotalWorkValues,
    // 松弛写入的备用缓冲，避免读写别名；每条语句处理后与 wf 互换
    wf_alt: TotalWorkValues,
    trace: Option<WfaTrace>,
}

impl WorkFunctionAlgorithm {
    pub fn new(partitions: &IndexPartitions, keep_history: bool) -> Self {
        let submachines: Vec<SubMachine> = partitions
            .iter()
            .map(|subset| SubMachine::new(subset.clone(), 0))
            .collect();
        // 工作函数起点: wf[s] = 从空配置转移到 s 的代价
        let mut wf = TotalWorkValues::new(partitions);
        for (m_idx, subset) in partitions.iter().enumerate() {
            for state in 0..subset.state_count() {
                wf.set(m_idx, state, SubMachine::transition_cost(subset, 0, state), 0);
            }
        }
        let wf_alt = TotalWorkValues::new(partitions);
        Self {
            submachines,
            wf,
            wf_alt,
            trace: keep_history.then(WfaTrace::new),
        }
    }

    pub fn submachines(&self) -> &[SubMachine] {
        &self.submachines
    }

    /// 当前 DP 值表（测试与轨迹重建用）
    pub fn work_values(&self) -> &TotalWorkValues {
        &self.wf
    }

    /// 处理一条语句：推进每个子集的工作函数并选出新推荐状态
    pub fn new_task(&mut self, query: &dyn ProfiledQuery) {
        for m_idx in 0..self.submachines.len() {
            let state_count = self.submachines[m_idx].subset.state_count();

            // 每个旧状态下本语句的执行代价
            let mut state_cost = vec![0.0; state_count];
            let mut config = BitSet::new();
            for state in 0..state_count {
                config.clear();
                self.submachines[m_idx].subset.expand_state(state, &mut config);
                state_cost[state] = query.cost(&config);
            }

            // 松弛：wf'[s] = min over s' of wf[s'] + cost(s') + trans(s', s)
            for new_state in 0..state_count {
                let mut best_value = f64::INFINITY;
                let mut best_pred = 0;
                for old_state in 0..state_count {
                    let value = self.wf.value(m_idx, old_state)
                        + state_cost[old_state]
                        + SubMachine::transition_cost(
                            &self.submachines[m_idx].subset,
                            old_state,
                            new_state,
                        );
                    if value < best_value {
                        best_value = value;
                        best_pred = old_state;
                    }
                }
                self.wf_alt.set(m_idx, new_state, best_value, best_pred);
            }

            // 懒惰策略选新推荐状态：仅在未被支配的延续里挑
            let machine = &mut self.submachines[m_idx];
            let mut chosen: Option<(usize, f64, f64)> = None;
            for state in 0..state_count {
                // 留在 state 不是最优延续时跳过；松弛包含 trans=0 的自环，
                // 等式成立时两边是同一次浮点运算的结果，可以精确比较
                if self.wf_alt.value(m_idx, state)
                    != self.wf.value(m_idx, state) + state_cost[state]
                {
                    continue;
                }
                let trans =
                    SubMachine::transition_cost(&machine.subset, state, machine.current_state);
                let value = self.wf_alt.value(m_idx, state) + trans;
                let better = match chosen {
                    None => true,
                    Some((best_state, best_value, best_trans)) => {
                        value < best_value
                            || (value == best_value && trans < best_trans)
                            || (value == best_value
                                && trans == best_trans
                                && state == machine.current_state
                                && best_state != machine.current_state)
                    }
                };
                if better {
                    chosen = Some((state, value, trans));
                }
            }
            if let Some((state, _, _)) = chosen {
                if state != machine.current_state {
                    debug!(
                        "子集 {} 推荐状态 {:#b} -> {:#b}",
                        m_idx, machine.current_state, state
                    );
                }
                machine.current_state = state;
            }
        }

        std::mem::swap(&mut self.wf, &mut self.wf_alt);

        if let Some(trace) = &mut self.trace {
            trace.add_entry(&self.wf, query.cost(&BitSet::new()));
        }
    }

    /// 用户投票：立即强制对应位并做单调修复
    ///
    /// 修复只抬高与强制位不一致的状态的值，从不降低任何值。
    pub fn vote(&mut self, id: IndexId, is_positive: bool) -> AdvisorResult<()> {
        let m_idx = self
            .submachines
            .iter()
            .position(|m| m.subset.contains(id))
            .ok_or(PartitionError::IndexNotInPartition(id))?;

        let machine = &mut self.submachines[m_idx];
        let position = match machine.subset.local_position(id) {
            Some(position) => position,
            None => return Err(PartitionError::IndexNotInPartition(id).into()),
        };
        let bit = 1usize << position;
        let creation_cost = machine.subset.index_at(position).creation_cost;

        machine.current_state = if is_positive {
            machine.current_state | bit
        } else {
            machine.current_state & !bit
        };
        info!(
            "对索引 #{} 的{}投票已生效",
            id,
            if is_positive { "正向" } else { "负向" }
        );

        let consistent = if is_positive { bit } else { 0 };
        let state_count = machine.subset.state_count();
        for state in 0..state_count {
            if state & bit == consistent {
                continue;
            }
            let forced_state = state ^ bit;
            let floor = self.wf.value(m_idx, forced_state) + creation_cost
                - SubMachine::transition_cost(&machine.subset, state, forced_state);
            if self.wf.value(m_idx, state) < floor {
                self.wf.set_value(m_idx, state, floor);
            }
        }
        Ok(())
    }

    /// 当前推荐配置的全局位向量
    pub fn recommendation_bits(&self) -> BitSet {
        let mut bits = BitSet::new();
        for machine in &self.submachines {
            machine.subset.expand_state(machine.current_state, &mut bits);
        }
        bits
    }

    /// 当前推荐的索引列表，按全局编号升序
    pub fn get_recommendation(&self) -> Vec<Arc<Index>> {
        let mut recommended: Vec<Arc<Index>> = Vec::new();
        for machine in &self.submachines {
            for (position, index) in machine.subset.iter().enumerate() {
                if machine.current_state & (1 << position) != 0 {
                    recommended.push(index.clone());
                }
            }
        }
        recommended.sort_by_key(|i| i.id);
        recommended
    }

    /// 迁移到新分区
    ///
    /// 新子集的初始状态取自迁移前的全局推荐；每个新状态的值由
    /// 重叠旧子集的投影值求和，再加上新进入热集且被该状态物化的
    /// 索引的创建代价。这是对真实重优化的近似，且不记录前驱。
    pub fn repartition(&mut self, new_partitions: &IndexPartitions) {
        let old_recommendation = self.recommendation_bits();
        let mut old_hot = BitSet::new();
        for machine in &self.submachines {
            old_hot.union_with(machine.subset.bits());
        }

        let old_machines = std::mem::take(&mut self.submachines);
        let old_wf = std::mem::replace(&mut self.wf, TotalWorkValues::new(new_partitions));

        for (n_idx, subset) in new_partitions.iter().enumerate() {
            let overlapping: Vec<usize> = old_machines
                .iter()
                .enumerate()
                .filter(|(_, m)| m.subset.overlaps(subset))
                .map(|(o_idx, _)| o_idx)
                .collect();

            let mut config = BitSet::new();
            for state in 0..subset.state_count() {
                let mut value = 0.0;
                for (position, index) in subset.iter().enumerate() {
                    if state & (1 << position) != 0 && !old_hot.contains(index.id) {
                        value += index.creation_cost;
                    }
                }
                config.clear();
                subset.expand_state(state, &mut config);
                for &o_idx in &overlapping {
                    let old_state = old_machines[o_idx].subset.project_state(&config);
                    value += old_wf.value(o_idx, old_state);
                }
                self.wf.set(n_idx, state, value, 0);
            }

            let initial_state = subset.project_state(&old_recommendation);
            self.submachines
                .push(SubMachine::new(subset.clone(), initial_state));
        }

        self.wf_alt.reshape(new_partitions);
        info!(
            "重分区完成: {} 个子集, 共 {} 个状态",
            new_partitions.subset_count(),
            new_partitions.total_state_count()
        );

        if let Some(trace) = &mut self.trace {
            warn!("重分区截断了 DP 快照历史, 最优调度重建不跨越此边界");
            trace.truncate_at_boundary();
        }
    }

    /// 由快照历史反向重建离线最优调度
    ///
    /// 返回每条语句执行时的全局最优配置；未开启历史记录时为 None
    pub fn optimal_schedule(&self) -> Option<Vec<BitSet>> {
        let trace = self.trace.as_ref()?;
        let count = trace.len();
        let mut schedule = vec![BitSet::new(); count];
        if count == 0 {
            return Some(schedule);
        }

        for (m_idx, machine) in self.submachines.iter().enumerate() {
            let state_count = machine.subset.state_count();
            let last = &trace.entry(count - 1).values;
            let mut state = 0;
            for candidate in 1..state_count {
                if last.value(m_idx, candidate) < last.value(m_idx, state) {
                    state = candidate;
                }
            }
            // entry t 的前驱给出第 t 条语句执行时所处的状态
            for t in (0..count).rev() {
                state = trace.entry(t).values.predecessor(m_idx, state);
                machine.subset.expand_state(state, &mut schedule[t]);
            }
        }
        Some(schedule)
    }

    /// 空配置代价累计（历史记录开启时）
    pub fn null_cost_total(&self) -> Option<f64> {
        self.trace.as_ref().map(|t| t.null_cost_total())
    }
}
