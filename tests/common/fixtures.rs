//! 测试数据构造模块
//!
//! 提供合成的语句剖析结果与候选索引构造函数

use std::collections::HashMap;

use indextune::config::Config;
use indextune::core::{BitSet, Index, IndexDef, IndexId};
use indextune::oracle::ProfiledQuery;

/// 合成的语句剖析结果
///
/// cost(config) = 基础代价 - Σ 已物化索引的收益
///              - Σ 两端都已物化的索引对的联合加成
pub struct SyntheticQuery {
    statement: String,
    base_cost: f64,
    benefits: HashMap<IndexId, f64>,
    interactions: HashMap<(IndexId, IndexId), f64>,
    maintenance: HashMap<IndexId, f64>,
}

impl SyntheticQuery {
    pub fn new(statement: &str, base_cost: f64) -> Self {
        Self {
            statement: statement.to_string(),
            base_cost,
            benefits: HashMap::new(),
            interactions: HashMap::new(),
            maintenance: HashMap::new(),
        }
    }

    pub fn with_benefit(mut self, id: IndexId, benefit: f64) -> Self {
        self.benefits.insert(id, benefit);
        self
    }

    pub fn with_interaction(mut self, a: IndexId, b: IndexId, degree: f64) -> Self {
        self.interactions.insert(pair(a, b), degree);
        self
    }

    pub fn with_maintenance(mut self, id: IndexId, cost: f64) -> Self {
        self.maintenance.insert(id, cost);
        self
    }
}

fn pair(a: IndexId, b: IndexId) -> (IndexId, IndexId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl ProfiledQuery for SyntheticQuery {
    fn statement(&self) -> &str {
        &self.statement
    }

    fn cost(&self, config: &BitSet) -> f64 {
        let saved: f64 = config
            .iter()
            .map(|id| self.benefits.get(&id).copied().unwrap_or(0.0))
            .sum();
        let joint: f64 = self
            .interactions
            .iter()
            .filter(|((a, b), _)| config.contains(*a) && config.contains(*b))
            .map(|(_, degree)| degree)
            .sum();
        self.base_cost - saved - joint
    }

    fn maintenance_cost(&self, index: &Index) -> f64 {
        self.maintenance.get(&index.id).copied().unwrap_or(0.0)
    }

    fn best_benefit(&self, index: &Index) -> f64 {
        self.benefits.get(&index.id).copied().unwrap_or(0.0)
    }

    fn interaction(&self, a: IndexId, b: IndexId) -> f64 {
        self.interactions.get(&pair(a, b)).copied().unwrap_or(0.0)
    }
}

/// 单列候选索引
pub fn index_def(name: &str, table: &str, column: &str, creation_cost: f64) -> IndexDef {
    IndexDef::new(
        name.to_string(),
        table.to_string(),
        vec![column.to_string()],
        creation_cost,
    )
}

/// 集成测试通用的小型配置
pub fn test_config() -> Config {
    Config {
        max_hot_set_size: 4,
        max_num_states: 64,
        stats_window_size: 100,
        interaction_threshold: 0.0,
        keep_history: false,
    }
}
