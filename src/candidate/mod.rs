//! 候选索引管理模块
//!
//! 提供候选池（永久编号分配）与索引集合类型

pub mod pool;
pub mod set;

pub use pool::{CandidatePool, PoolSnapshot};
pub use set::{DynamicIndexSet, StaticIndexSet};
