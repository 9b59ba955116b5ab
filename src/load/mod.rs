pub(crate) mod client;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) use client::LoadClient;

/// One request sent by the load client. `status_code` is 0 when the request
/// never got an HTTP answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LoadTestResult {
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) response_time: f64,
    pub(crate) status_code: u16,
    pub(crate) error: Option<String>,
}

/// Response times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TestSummary {
    pub(crate) test_name: String,
    pub(crate) duration: f64,
    pub(crate) total_requests: usize,
    pub(crate) successful_requests: usize,
    pub(crate) failed_requests: usize,
    pub(crate) avg_response_time: f64,
    pub(crate) min_response_time: f64,
    pub(crate) max_response_time: f64,
    pub(crate) p95_response_time: f64,
    pub(crate) requests_per_second: f64,
}

impl TestSummary {
    fn empty(test_name: &str) -> Self {
        TestSummary {
            test_name: test_name.to_string(),
            duration: 0.0,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            avg_response_time: 0.0,
            min_response_time: 0.0,
            max_response_time: 0.0,
            p95_response_time: 0.0,
            requests_per_second: 0.0,
        }
    }

    pub(crate) fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }

        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoadTestReport<'a> {
    pub(crate) summary: &'a TestSummary,
    pub(crate) results: &'a [LoadTestResult],
}

/// Latency figures only count status 200 answers, the request rate counts
/// everything that was sent.
pub(crate) fn analyze_results(results: &[LoadTestResult], test_name: &str) -> TestSummary {
    if results.is_empty() {
        return TestSummary::empty(test_name);
    }

    let mut response_times: Vec<f64> = results
        .iter()
        .filter(|result| result.status_code == 200)
        .map(|result| result.response_time)
        .collect();
    response_times.sort_by(f64::total_cmp);

    let successful_requests = response_times.len();

    let first = results.iter().map(|result| result.timestamp).min();
    let last = results.iter().map(|result| result.timestamp).max();
    let duration = match (first, last) {
        (Some(first), Some(last)) => (last - first).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0,
        _ => 0.0,
    };

    let (avg, min, max) = if response_times.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            response_times.iter().sum::<f64>() / successful_requests as f64,
            response_times[0],
            response_times[successful_requests - 1],
        )
    };

    TestSummary {
        test_name: test_name.to_string(),
        duration,
        total_requests: results.len(),
        successful_requests,
        failed_requests: results.len() - successful_requests,
        avg_response_time: avg,
        min_response_time: min,
        max_response_time: max,
        p95_response_time: if successful_requests > 20 { p95(&response_times) } else { 0.0 },
        requests_per_second: if duration > 0.0 { results.len() as f64 / duration } else { 0.0 },
    }
}

/// 19th cut point of 20 quantiles with the exclusive method. `sorted` must
/// hold at least two values.
fn p95(sorted: &[f64]) -> f64 {
    const N: usize = 20;
    const I: usize = 19;

    let m = sorted.len() + 1;
    let j = (I * m / N).clamp(1, sorted.len() - 1);
    let delta = (I * m) as f64 - (j * N) as f64;

    (sorted[j - 1] * (N as f64 - delta) + sorted[j] * delta) / N as f64
}
