pub(crate) mod host;

use crate::api::dto::system::SystemSnapshot;

pub(crate) use host::SysinfoHostMetrics;

/// Best-effort access to host level signals. Every signal may be missing on
/// a given platform, in which case the provider answers `None`.
pub(crate) trait HostMetricsProvider: Send + Sync {
    fn hostname(&self) -> Option<String>;
    /// 1, 5 and 15 minute load averages.
    fn load_average(&self) -> Option<[f64; 3]>;
    fn memory_total_mb(&self) -> Option<u64>;
    fn memory_available_mb(&self) -> Option<u64>;
    fn cpu_core_count(&self) -> Option<usize>;
    fn uptime_seconds(&self) -> Option<f64>;
    fn process_memory_usage_mb(&self) -> Option<f64>;
    /// Memory ceiling enforced on this process, `"unlimited"` when none is set.
    fn process_memory_limit(&self) -> Option<String>;

    /// Every signal of the `info` action at once. Providers that pay for each
    /// read override this to share a single refresh.
    fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            load_average: self.load_average(),
            memory_total_mb: self.memory_total_mb(),
            memory_available_mb: self.memory_available_mb(),
            cpu_core_count: self.cpu_core_count(),
            process_memory_limit: self.process_memory_limit(),
            process_memory_usage_mb: self.process_memory_usage_mb(),
        }
    }
}

pub(crate) fn collect(provider: &dyn HostMetricsProvider) -> SystemSnapshot {
    provider.snapshot()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
