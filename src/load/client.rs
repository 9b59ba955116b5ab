use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use ureq::{Agent, AgentBuilder};

use crate::load::LoadTestResult;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client driving load at a running server.
#[derive(Debug, Clone)]
pub(crate) struct LoadClient {
    base_url: String,
    agent: Agent,
}

impl LoadClient {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Self {
        LoadClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub(crate) fn make_request(&self, endpoint: &str) -> LoadTestResult {
        let url = format!("{}{}", self.base_url, endpoint);
        let start = Instant::now();

        let (status_code, error) = match self.agent.get(&url).call() {
            Ok(response) => {
                let status = response.status();
                match response.into_string() {
                    Ok(_) => (status, None),
                    Err(err) => (status, Some(err.to_string())),
                }
            }
            Err(ureq::Error::Status(status, _)) => (status, None),
            Err(err) => (0, Some(err.to_string())),
        };

        LoadTestResult {
            timestamp: Utc::now(),
            response_time: start.elapsed().as_secs_f64(),
            status_code,
            error,
        }
    }

    /// Sends `requests` requests with at most `concurrency` in flight.
    pub(crate) fn burst_load(&self, endpoint: &str, requests: usize, concurrency: usize) -> Vec<LoadTestResult> {
        let workers = concurrency.max(1).min(requests);
        let next = AtomicUsize::new(0);

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut results = Vec::new();
                        while next.fetch_add(1, Ordering::Relaxed) < requests {
                            results.push(self.make_request(endpoint));
                        }
                        results
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .flatten()
                .collect()
        })
    }

    /// Sends requests one after another for `duration`, paced at `rps`.
    pub(crate) fn sustained_load(&self, endpoint: &str, duration: Duration, rps: u32) -> Vec<LoadTestResult> {
        let deadline = Instant::now() + duration;
        let interval = Duration::from_secs_f64(1.0 / f64::from(rps.max(1)));
        let mut results = Vec::new();

        while Instant::now() < deadline {
            let request_start = Instant::now();
            results.push(self.make_request(endpoint));

            if let Some(remaining) = interval.checked_sub(request_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        results
    }

    /// Splits `duration` into `steps` sustained phases, raising the rate
    /// linearly up to `max_rps`.
    pub(crate) fn ramp_up_load(&self, endpoint: &str, duration: Duration, max_rps: u32, steps: u32) -> Vec<LoadTestResult> {
        let steps = steps.max(1);
        let step_duration = Duration::from_secs(duration.as_secs() / u64::from(steps));
        let step_increase = f64::from(max_rps) / f64::from(steps);
        let mut results = Vec::new();

        for step in 1..=steps {
            let current_rps = (f64::from(step) * step_increase) as u32;
            info!("Step {}/{}: {} RPS for {}s", step, steps, current_rps, step_duration.as_secs());

            results.extend(self.sustained_load(endpoint, step_duration, current_rps));
        }

        results
    }
}
