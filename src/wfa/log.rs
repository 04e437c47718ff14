//! 推荐日志模块
//!
//! 追加式记录每条语句处理后的推荐及其与上一条推荐的差异，
//! 提供人类可读的报表渲染与代价汇总。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::core::IndexId;

/// 单条语句的推荐记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub statement: String,
    /// 本条语句处理后的推荐配置，升序
    pub recommendation: Vec<IndexId>,
    /// 相对上一条推荐新增的索引
    pub created: Vec<IndexId>,
    /// 相对上一条推荐撤下的索引
    pub dropped: Vec<IndexId>,
    /// 推荐配置下本条语句的执行代价
    pub query_cost: f64,
    /// 相对上一条推荐的转移代价
    pub transition_cost: f64,
}

/// 推荐历史日志
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationLog {
    entries: Vec<LogEntry>,
}

impl RecommendationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录，差异相对上一条记录计算
    pub fn record(
        &mut self,
        statement: &str,
        recommendation: Vec<IndexId>,
        query_cost: f64,
        transition_cost: f64,
    ) -> &LogEntry {
        let previous: &[IndexId] = self
            .entries
            .last()
            .map(|e| e.recommendation.as_slice())
            .unwrap_or(&[]);
        let created = recommendation
            .iter()
            .copied()
            .filter(|id| !previous.contains(id))
            .collect();
        let dropped = previous
            .iter()
            .copied()
            .filter(|id| !recommendation.contains(id))
            .collect();

        self.entries.push(LogEntry {
            seq: self.entries.len() as u64,
            timestamp: Local::now(),
            statement: statement.to_string(),
            recommendation,
            created,
            dropped,
            query_cost,
            transition_cost,
        });
        // 刚刚追加过，必然非空
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全部语句的执行代价合计
    pub fn total_query_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.query_cost).sum()
    }

    /// 全部推荐变更的转移代价合计
    pub fn total_transition_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.transition_cost).sum()
    }

    /// 渲染人类可读的推荐历史报表
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(
                out,
                "#{} [{}] 执行代价 {:.2}, 转移代价 {:.2}",
                entry.seq,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.query_cost,
                entry.transition_cost,
            );
            if !entry.created.is_empty() {
                let _ = writeln!(out, "  新建: {:?}", entry.created);
            }
            if !entry.dropped.is_empty() {
                let _ = writeln!(out, "  撤下: {:?}", entry.dropped);
            }
            let _ = writeln!(out, "  推荐: {:?}", entry.recommendation);
        }
        let _ = writeln!(
            out,
            "合计: {} 条语句, 执行代价 {:.2}, 转移代价 {:.2}",
            self.entries.len(),
            self.total_query_cost(),
            self.total_transition_cost(),
        );
        out
    }
}
