use std::time::Duration;

use serde::Deserialize;

use crate::api::dto::stress::DURATION_MAX;
use crate::stress::memory::DEFAULT_HOLD;

/// Slack on top of burn and hold for allocation, scheduling and serialization.
const RUN_OVERHEAD_SECONDS: u64 = 20;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 =
    DURATION_MAX as u64 + DEFAULT_HOLD.as_secs() + RUN_OVERHEAD_SECONDS;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub(crate) struct Stress {
    pub(crate) memory_hold_seconds: u64,
    pub(crate) request_timeout_seconds: u64,
}

impl Stress {
    /// Configured timeout, raised when needed so the longest accepted stress
    /// run (maximum duration plus the memory hold) still answers 200.
    pub(crate) fn request_timeout(&self) -> Duration {
        let longest_run = (DURATION_MAX as u64)
            .saturating_add(self.memory_hold_seconds)
            .saturating_add(RUN_OVERHEAD_SECONDS);

        Duration::from_secs(self.request_timeout_seconds.max(longest_run))
    }
}

impl Default for Stress {
    fn default() -> Self {
        Stress {
            memory_hold_seconds: DEFAULT_HOLD.as_secs(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}
