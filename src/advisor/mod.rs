//! 在线顾问模块
//!
//! 把各组件串成每条语句的处理流水线：
//! 统计更新 -> 候选重组（热集选择 + 交互度分区）-> 工作函数推进 -> 推荐输出
//!
//! 候选索引由外部 what-if 预估器从语句中提取，经 `add_candidate`
//! 登记后参与后续所有决策。引擎单线程同步运行，一条语句处理完毕
//! 才接受下一条；调用方负责串行化。

use log::info;
use std::sync::Arc;

use crate::candidate::{CandidatePool, DynamicIndexSet, PoolSnapshot, StaticIndexSet};
use crate::config::Config;
use crate::core::{AdvisorError, AdvisorResult, Index, IndexDef, IndexId, Recommendation};
use crate::hotset::choose_hot_set;
use crate::oracle::ProfiledQuery;
use crate::partition::{choose_partitions, IndexPartitions};
use crate::stats::WorkloadStatistics;
use crate::wfa::{RecommendationLog, WorkFunctionAlgorithm};

/// 在线索引调优顾问
pub struct WfitAdvisor {
    config: Config,
    /// 热集容量，必选集增长时自动扩张
    max_hot_set_size: usize,
    pool: CandidatePool,
    stats: WorkloadStatistics,
    hot_set: StaticIndexSet,
    partitions: IndexPartitions,
    wfa: WorkFunctionAlgorithm,
    /// 外部实际已物化的索引集
    materialized: DynamicIndexSet,
    /// 用户正向投票强制保留的索引集
    required: DynamicIndexSet,
    log: RecommendationLog,
    seq: u64,
}

impl WfitAdvisor {
    pub fn new(config: Config) -> AdvisorResult<Self> {
        config.validate()?;
        let hot_set = StaticIndexSet::empty();
        let partitions = IndexPartitions::singletons(&hot_set, config.max_num_states);
        let wfa = WorkFunctionAlgorithm::new(&partitions, config.keep_history);
        let stats = WorkloadStatistics::new(config.stats_window_size);
        Ok(Self {
            max_hot_set_size: config.max_hot_set_size,
            config,
            pool: CandidatePool::new(),
            stats,
            hot_set,
            partitions,
            wfa,
            materialized: DynamicIndexSet::new(),
            required: DynamicIndexSet::new(),
            log: RecommendationLog::new(),
            seq: 0,
        })
    }

    /// 登记候选索引（由外部预估器从语句中提取），返回永久编号
    pub fn add_candidate(&mut self, def: &IndexDef) -> IndexId {
        self.pool.add_index(def)
    }

    /// 处理一条已剖析语句，返回最新推荐
    pub fn analyze(&mut self, query: &dyn ProfiledQuery) -> AdvisorResult<Recommendation> {
        let snapshot = self.pool.snapshot();
        self.stats.add_query(query, &snapshot, &self.materialized);
        self.reorganize_candidates(&snapshot);
        self.wfa.new_task(query);
        Ok(self.emit(query))
    }

    /// 正向投票：强制保留该索引
    ///
    /// 必选集超过热集容量时容量自动扩张；索引不在任何子集中时
    /// 投票失败，但必选集的登记保留，下一次重组会将其纳入。
    pub fn positive_vote(&mut self, id: IndexId) -> AdvisorResult<()> {
        let index = self.lookup(id)?;
        self.required.insert(index);
        if self.required.len() > self.max_hot_set_size {
            self.max_hot_set_size = self.required.len();
            info!("必选集超出热集容量, 自动扩张到 {}", self.max_hot_set_size);
        }
        self.wfa.vote(id, true)
    }

    /// 负向投票：撤销强制保留并压制该索引
    pub fn negative_vote(&mut self, id: IndexId) -> AdvisorResult<()> {
        self.lookup(id)?;
        self.required.remove(id);
        self.wfa.vote(id, false)
    }

    /// 外部已实际创建某索引，返回计入的创建代价
    pub fn create(&mut self, id: IndexId) -> AdvisorResult<f64> {
        let index = self.lookup(id)?;
        let cost = index.creation_cost;
        if self.materialized.insert(index) {
            Ok(cost)
        } else {
            Ok(0.0)
        }
    }

    /// 外部已实际撤下某索引；本模型中撤下代价为零
    pub fn drop_index(&mut self, id: IndexId) -> AdvisorResult<f64> {
        self.lookup(id)?;
        self.materialized.remove(id);
        Ok(0.0)
    }

    /// 当前推荐的索引列表，按全局编号升序
    pub fn recommendation(&self) -> Vec<Arc<Index>> {
        self.wfa.get_recommendation()
    }

    pub fn hot_set(&self) -> &StaticIndexSet {
        &self.hot_set
    }

    pub fn partitions(&self) -> &IndexPartitions {
        &self.partitions
    }

    pub fn statistics(&self) -> &WorkloadStatistics {
        &self.stats
    }

    pub fn materialized(&self) -> &DynamicIndexSet {
        &self.materialized
    }

    /// 用户强制保留的索引集
    pub fn required(&self) -> &DynamicIndexSet {
        &self.required
    }

    pub fn log(&self) -> &RecommendationLog {
        &self.log
    }

    pub fn work_function(&self) -> &WorkFunctionAlgorithm {
        &self.wfa
    }

    fn lookup(&self, id: IndexId) -> AdvisorResult<Arc<Index>> {
        self.pool
            .get(id)
            .cloned()
            .ok_or_else(|| AdvisorError::IndexNotFound(format!("#{}", id)))
    }

    /// 重新选择热集与分区，仅在确有变化时提交，避免迁移扰动
    fn reorganize_candidates(&mut self, snapshot: &PoolSnapshot) {
        let new_hot_set = choose_hot_set(
            snapshot,
            &self.hot_set,
            &self.required,
            &self.stats,
            self.max_hot_set_size,
        );
        let new_partitions = choose_partitions(
            &new_hot_set,
            &self.stats,
            self.config.interaction_threshold,
            self.config.max_num_states,
        );
        if new_hot_set != self.hot_set || new_partitions != self.partitions {
            info!(
                "候选重组: 热集 {} 个索引, {} 个子集, {} 个状态",
                new_hot_set.len(),
                new_partitions.subset_count(),
                new_partitions.total_state_count(),
            );
            self.wfa.repartition(&new_partitions);
            self.hot_set = new_hot_set;
            self.partitions = new_partitions;
        }
    }

    fn emit(&mut self, query: &dyn ProfiledQuery) -> Recommendation {
        let bits = self.wfa.recommendation_bits();
        let indexes: Vec<IndexId> = bits.iter().collect();
        let query_cost = query.cost(&bits);

        let previous: Vec<IndexId> = self
            .log
            .last()
            .map(|e| e.recommendation.clone())
            .unwrap_or_default();
        let transition_cost: f64 = indexes
            .iter()
            .filter(|id| !previous.contains(id))
            .filter_map(|&id| self.pool.get(id))
            .map(|index| index.creation_cost)
            .sum();

        let entry = self
            .log
            .record(query.statement(), indexes.clone(), query_cost, transition_cost);
        let recommendation = Recommendation {
            seq: self.seq,
            indexes,
            created: entry.created.clone(),
            dropped: entry.dropped.clone(),
            transition_cost,
        };
        self.seq += 1;
        recommendation
    }
}
