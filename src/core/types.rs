//! 核心类型定义模块
//!
//! 提供索引元数据与推荐结果类型。引擎将索引视为不透明实体，
//! 只依赖其编号、创建代价与同一性判断。

use serde::{Deserialize, Serialize};

/// 索引的全局编号，由候选池分配，永不回收或重用
pub type IndexId = usize;

/// 索引元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub id: IndexId,
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    /// 物化该索引的一次性创建代价
    pub creation_cost: f64,
}

impl Index {
    pub fn new(
        id: IndexId,
        name: String,
        table: String,
        columns: Vec<String>,
        creation_cost: f64,
    ) -> Self {
        Self {
            id,
            name,
            table,
            columns,
            creation_cost,
        }
    }
}

impl PartialEq for Index {
    // 同一性由候选池分配的编号决定
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Index {}

/// 外部元数据描述的候选索引，尚未由候选池编号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub creation_cost: f64,
}

impl IndexDef {
    pub fn new(name: String, table: String, columns: Vec<String>, creation_cost: f64) -> Self {
        Self {
            name,
            table,
            columns,
            creation_cost,
        }
    }

    /// 同一性键：同表同列视为同一个索引
    pub fn identity_key(&self) -> (String, Vec<String>) {
        (self.table.clone(), self.columns.clone())
    }
}

/// 单条语句处理后的推荐结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 语句序号，从 0 开始
    pub seq: u64,
    /// 当前建议物化的索引编号，升序
    pub indexes: Vec<IndexId>,
    /// 相对上一条推荐新增的索引
    pub created: Vec<IndexId>,
    /// 相对上一条推荐撤下的索引
    pub dropped: Vec<IndexId>,
    /// 相对上一条推荐的转移代价（新增索引的创建代价之和）
    pub transition_cost: f64,
}
