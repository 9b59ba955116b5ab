pub(crate) mod cpu;
pub(crate) mod error;
pub(crate) mod memory;

use std::time::{Duration, Instant};

pub(crate) use error::StressError;

/// Outcome of one stress run. Failures inside a phase are logged and never
/// abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StressReport {
    pub(crate) execution_time: u64,
    pub(crate) cpu_batches: u64,
    pub(crate) memory_held: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct LoadGenerator {
    memory_hold: Duration,
}

impl LoadGenerator {
    pub(crate) fn new(memory_hold: Duration) -> Self {
        LoadGenerator { memory_hold }
    }

    /// Burns `cores` workers for `duration`, then holds `memory_mb` for the
    /// configured hold interval. Blocks the calling thread for the whole run.
    pub(crate) fn run(&self, cores: u32, duration: Duration, memory_mb: u32) -> StressReport {
        let start = Instant::now();

        let cpu_batches = match cpu::burn_cpu(cores, duration) {
            Ok(batches) => batches,
            Err(err) => {
                error!("CPU stress error: {}", err);
                0
            }
        };

        let mut memory_held = false;
        if memory_mb > 0 {
            match memory::hold_memory(memory_mb, self.memory_hold) {
                Ok(()) => memory_held = true,
                Err(err) => error!("Memory stress error: {}", err),
            }
        }

        StressReport {
            execution_time: start.elapsed().as_secs(),
            cpu_batches,
            memory_held,
        }
    }

    /// Runs [`LoadGenerator::run`] on the blocking pool so the burn never
    /// stalls the async reactor serving other requests.
    pub(crate) async fn run_blocking(
        &self,
        cores: u32,
        duration: Duration,
        memory_mb: u32,
    ) -> Result<StressReport, StressError> {
        let generator = self.clone();

        let report = tokio::task::spawn_blocking(move || generator.run(cores, duration, memory_mb)).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_only_run_skips_memory_phase() {
        let generator = LoadGenerator::new(Duration::from_secs(30));
        let start = Instant::now();

        let report = generator.run(1, Duration::from_millis(100), 0);

        assert!(!report.memory_held);
        assert!(report.cpu_batches >= 1);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn memory_phase_follows_cpu_phase() {
        let generator = LoadGenerator::new(Duration::from_millis(300));
        let start = Instant::now();

        let report = generator.run(1, Duration::from_millis(200), 4);

        assert!(report.memory_held);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn failed_allocation_still_completes_the_run() {
        let generator = LoadGenerator::new(Duration::from_millis(10));

        let report = generator.run(1, Duration::from_millis(10), u32::MAX);

        assert!(!report.memory_held);
        assert!(report.cpu_batches >= 1);
        assert!(report.execution_time < 5);
    }

    #[tokio::test]
    async fn failed_allocation_through_blocking_pool() {
        let generator = LoadGenerator::new(Duration::from_secs(30));

        let report = generator
            .run_blocking(1, Duration::from_millis(10), u32::MAX)
            .await
            .unwrap();

        assert!(!report.memory_held);
    }

    #[tokio::test]
    async fn run_blocking_reports_whole_seconds() {
        let generator = LoadGenerator::new(Duration::from_millis(10));

        let report = generator
            .run_blocking(2, Duration::from_secs(1), 1)
            .await
            .unwrap();

        assert!(report.execution_time >= 1);
        assert!(report.memory_held);
    }
}
