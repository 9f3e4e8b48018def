// ==========================================
// 服务监控看板 - 更新轮次性能统计
// ==========================================
// 记录 elapsed_ms + 节点重算次数,超过阈值的轮次按 warn 输出
// 开关:
// - `SVC_STATUS_SLOW_PASS_MS=20` 配置慢轮次阈值 (毫秒,默认 Debug 20 / Release 100)
// ==========================================

use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static RECOMPUTE_COUNT: Cell<u64> = Cell::new(0);
}

fn slow_pass_threshold_ms() -> u64 {
    std::env::var("SVC_STATUS_SLOW_PASS_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 20 } else { 100 })
}

/// 记录一次节点重算 (仅在 PerfGuard 作用域内计数)
pub fn record_recompute() {
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if active {
        RECOMPUTE_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }
}

/// 性能统计 Guard
///
/// 使用方式：
/// ```ignore
/// let _perf = svc_status::perf::PerfGuard::new("settle");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    recompute_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let recompute_start = RECOMPUTE_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            recompute_start,
        }
    }

    /// 作用域内已记录的重算次数
    pub fn recomputed(&self) -> u64 {
        RECOMPUTE_COUNT
            .with(|c| c.get())
            .saturating_sub(self.recompute_start)
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let recomputed = self.recomputed();

        if elapsed_ms >= slow_pass_threshold_ms() {
            tracing::warn!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                recomputed,
                "slow pass"
            );
        } else {
            tracing::debug!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                recomputed,
                "done"
            );
        }

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recompute_counted_only_inside_guard() {
        record_recompute();
        let guard = PerfGuard::new("test");
        record_recompute();
        record_recompute();
        assert_eq!(guard.recomputed(), 2);
    }
}
