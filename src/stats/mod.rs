//! 统计与评估策略模块
//!
//! 提供：
//! - 收益与交互度的滑动窗口估计器
//! - 热集选择与分区策略所依赖的两个单方法能力接口

pub mod tracker;
pub mod window;

pub use tracker::WorkloadStatistics;
pub use window::MeasurementWindow;

use crate::core::{BitSet, Index, IndexId};

/// 候选收益评估能力
///
/// `selected` 为已选入的集合，支持贪心选择时的上下文相关打分；
/// 与上下文无关的实现可以忽略它
pub trait BenefitFunction {
    fn benefit(&self, index: &Index, selected: &BitSet) -> f64;
}

/// 成对交互度评估能力
pub trait DoiFunction {
    fn degree(&self, a: IndexId, b: IndexId) -> f64;
}

/// 常数收益策略
pub struct UniformBenefit(pub f64);

impl BenefitFunction for UniformBenefit {
    fn benefit(&self, _index: &Index, _selected: &BitSet) -> f64 {
        self.0
    }
}

/// 常数交互度策略
pub struct UniformDoi(pub f64);

impl DoiFunction for UniformDoi {
    fn degree(&self, _a: IndexId, _b: IndexId) -> f64 {
        self.0
    }
}
