//! 统一错误处理模块
//!
//! 设计原则：
//! - 核心错误（如分区）使用独立枚举，通过 `#[from]` 汇聚到统一类型
//! - 外部协作方（代价预估器）的错误转换为字符串，降低耦合
//! - `AdvisorResult<T>` 提供统一的返回类型，简化错误传播

use thiserror::Error;

/// 顾问引擎统一错误类型
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("索引未找到: {0}")]
    IndexNotFound(String),

    #[error("分区错误: {0}")]
    Partition(#[from] PartitionError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("代价预估错误: {0}")]
    Oracle(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 分区操作错误
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("状态总数超过上限: 需要 {required}, 上限 {limit}")]
    StateLimitExceeded { required: usize, limit: usize },

    #[error("子集下标越界: {0}")]
    SubsetOutOfRange(usize),

    #[error("索引 {0} 不属于任何子集")]
    IndexNotInPartition(usize),
}

/// 统一的结果类型
pub type AdvisorResult<T> = Result<T, AdvisorError>;
