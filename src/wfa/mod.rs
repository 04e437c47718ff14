//! 工作函数算法引擎模块
//!
//! 提供：
//! - 按子集平铺的 DP 值表
//! - 工作函数算法本体（松弛、懒惰选态、投票修复、重分区迁移）
//! - DP 快照轨迹与离线最优调度重建
//! - 推荐历史日志

pub mod algorithm;
pub mod log;
pub mod trace;
pub mod work_values;

pub use algorithm::{SubMachine, WorkFunctionAlgorithm};
pub use log::{LogEntry, RecommendationLog};
pub use trace::{TraceEntry, WfaTrace};
pub use work_values::TotalWorkValues;
