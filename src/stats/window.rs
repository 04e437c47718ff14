//! 滑动窗口模块
//!
//! 固定容量的 (测量值, 虚拟时间戳) 窗口。时间戳来自以执行代价
//! 推进的虚拟时钟，统计因此随负载量而非墙上时间衰减。

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    measurement: f64,
    timestamp: f64,
}

/// 固定容量的测量窗口
#[derive(Debug, Clone)]
pub struct MeasurementWindow {
    capacity: usize,
    entries: VecDeque<WindowEntry>,
}

impl MeasurementWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// 记录一次测量，窗口满时淘汰最旧的一条
    pub fn record(&mut self, measurement: f64, timestamp: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(WindowEntry {
            measurement,
            timestamp,
        });
    }

    /// 所有窗口后缀上观测到的最大速率
    ///
    /// 对每个后缀计算 Σ测量值 / (now - 后缀内最旧时间戳)，取最大值。
    /// 既不过度响应单次噪声，也不迟钝于持续趋势。
    pub fn max_rate(&self, now: f64) -> f64 {
        let mut sum = 0.0;
        let mut best = 0.0;
        for entry in self.entries.iter().rev() {
            sum += entry.measurement;
            let elapsed = now - entry.timestamp;
            if elapsed > 0.0 {
                let rate = sum / elapsed;
                if rate > best {
                    best = rate;
                }
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_rate_is_zero() {
        let window = MeasurementWindow::new(4);
        assert_eq!(window.max_rate(10.0), 0.0);
    }

    #[test]
    fn test_single_measurement_rate() {
        let mut window = MeasurementWindow::new(4);
        window.record(6.0, 2.0);
        // 6.0 / (5.0 - 2.0)
        assert!((window.max_rate(5.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_suffix_wins() {
        let mut window = MeasurementWindow::new(4);
        // 旧的低速率段
        window.record(1.0, 0.0);
        // 新的高速率段
        window.record(8.0, 8.0);
        // 全窗口: 9/10 = 0.9；仅最新: 8/2 = 4.0
        assert!((window.max_rate(10.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_sustained_trend_uses_full_window() {
        let mut window = MeasurementWindow::new(4);
        window.record(5.0, 0.0);
        window.record(5.0, 1.0);
        window.record(5.0, 2.0);
        // 全窗口: 15/4 = 3.75；仅最新: 5/2 = 2.5
        assert!((window.max_rate(4.0) - 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut window = MeasurementWindow::new(2);
        window.record(100.0, 0.0);
        window.record(1.0, 1.0);
        window.record(1.0, 2.0);
        assert_eq!(window.len(), 2);
        // 时间戳 0.0 的大测量值已被淘汰
        // 后缀 [1,1]: 2/2=1.0；后缀 [1]: 1/1=1.0
        assert!((window.max_rate(3.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_suffix_skipped() {
        let mut window = MeasurementWindow::new(2);
        window.record(3.0, 1.0);
        window.record(7.0, 5.0);
        // now 等于最新时间戳时，该后缀无法定义速率，退回更长的后缀
        assert!((window.max_rate(5.0) - 10.0 / 4.0).abs() < 1e-9);
    }
}
