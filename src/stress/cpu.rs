use std::hint::black_box;
use std::thread;
use std::time::{Duration, Instant};

use crate::stress::error::StressError;

/// Iterations of transcendental math performed between two yields.
pub(crate) const BATCH_SIZE: u32 = 1_000_000;

/// Pause after every batch so the host scheduler is never fully starved.
pub(crate) const YIELD_INTERVAL: Duration = Duration::from_millis(1);

/// Keeps `cores` workers busy until `now + duration`.
///
/// The calling thread is always the first worker, extra workers are spawned
/// alongside it and joined at the deadline. A worker that cannot be spawned is
/// skipped, so at least one worker burns for the whole window. Returns the
/// number of batches computed across every worker.
pub(crate) fn burn_cpu(cores: u32, duration: Duration) -> Result<u64, StressError> {
    let deadline = Instant::now() + duration;
    let extra_workers = cores.max(1) as usize - 1;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(extra_workers);

        for worker in 1..=extra_workers {
            let spawned = thread::Builder::new()
                .name(format!("cpu-burn-{}", worker))
                .spawn_scoped(scope, move || burn_until(deadline));

            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(err) => warn!("Unable to spawn cpu burn worker {}: {}", worker, err),
            }
        }

        let mut batches = burn_until(deadline);
        let mut failure = None;

        for (worker, handle) in handles {
            match handle.join() {
                Ok(count) => batches += count,
                Err(_) => failure = Some(StressError::WorkerPanicked(worker)),
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(batches),
        }
    })
}

fn burn_until(deadline: Instant) -> u64 {
    let mut batches = 0;

    while Instant::now() < deadline {
        burn_batch();
        batches += 1;
        thread::sleep(YIELD_INTERVAL);
    }

    batches
}

fn burn_batch() -> f64 {
    let mut accumulator = 0.0;

    for i in 0..BATCH_SIZE {
        let x = f64::from(black_box(i));
        accumulator += x.sqrt() * x.sin() * x.cos();
    }

    black_box(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burns_until_deadline() {
        let start = Instant::now();
        let batches = burn_cpu(1, Duration::from_millis(200)).unwrap();

        assert!(start.elapsed() >= Duration::from_millis(200));
        assert!(batches >= 1);
    }

    #[test]
    fn zero_cores_still_runs_one_worker() {
        let start = Instant::now();
        let batches = burn_cpu(0, Duration::from_millis(100)).unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(batches >= 1);
    }

    #[test]
    fn every_worker_contributes_batches() {
        let batches = burn_cpu(3, Duration::from_millis(150)).unwrap();

        assert!(batches >= 3);
    }

    #[test]
    fn elapsed_deadline_does_no_work() {
        let batches = burn_cpu(2, Duration::ZERO).unwrap();

        assert_eq!(batches, 0);
    }
}
