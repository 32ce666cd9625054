use std::time::Duration;

use tracing::debug;

/// 默认重试间隔
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(250);
/// 默认最大重试次数（250ms × 40 = 10s）
pub const DEFAULT_RETRY_TICKS: u32 = 40;

/// 有上限的定时重试任务
///
/// 外壳布局变化后并不会立即反映到窗口查询结果中，也没有“布局已稳定”
/// 的通知，因此在限定时间内周期性地重新检查位置。
#[derive(Debug, Clone)]
pub struct BoundedRetry {
    interval: Duration,
    max_ticks: u32,
    remaining: u32,
}

impl BoundedRetry {
    pub fn new(interval: Duration, max_ticks: u32) -> Self {
        Self {
            interval,
            max_ticks,
            remaining: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 定时器周期（毫秒），至少为 1
    pub fn interval_ms(&self) -> u32 {
        self.interval.as_millis().clamp(1, u32::MAX as u128) as u32
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// 开始（或重新开始）一轮重试，返回调用前是否已在运行
    pub fn start(&mut self) -> bool {
        let was_active = self.is_active();
        self.remaining = self.max_ticks;
        debug!("开始定时重检: 每 {:?} 一次, 共 {} 次", self.interval, self.max_ticks);
        was_active
    }

    /// 消耗一次重试机会，返回本次是否应执行检查
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn stop(&mut self) {
        self.remaining = 0;
    }
}

impl Default for BoundedRetry {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_INTERVAL, DEFAULT_RETRY_TICKS)
    }
}
