//! 配置模块
//!
//! 引擎运行参数的加载、保存与校验

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{AdvisorError, AdvisorResult};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 热集容量上限
    pub max_hot_set_size: usize,
    /// 全部子集的状态总数上限
    pub max_num_states: usize,
    /// 统计滑动窗口容量
    pub stats_window_size: usize,
    /// 子集合并所需的最小交互度
    pub interaction_threshold: f64,
    /// 是否保留 DP 快照历史用于离线最优调度重建
    pub keep_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_hot_set_size: 40,
            max_num_states: 1024,
            stats_window_size: 100,
            interaction_threshold: 0.0,
            keep_history: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> AdvisorResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| AdvisorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> AdvisorResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AdvisorError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 校验参数组合是否可用
    pub fn validate(&self) -> AdvisorResult<()> {
        if self.max_hot_set_size == 0 {
            return Err(AdvisorError::Config("max_hot_set_size 不能为 0".to_string()));
        }
        if self.max_num_states < 2 {
            return Err(AdvisorError::Config("max_num_states 不能小于 2".to_string()));
        }
        if self.stats_window_size == 0 {
            return Err(AdvisorError::Config("stats_window_size 不能为 0".to_string()));
        }
        if self.interaction_threshold < 0.0 {
            return Err(AdvisorError::Config(
                "interaction_threshold 不能为负".to_string(),
            ));
        }
        Ok(())
    }
}
