use serde::Serialize;

use crate::api::dto::system::SystemSnapshot;

pub(crate) const CPU_CORES_MIN: i64 = 1;
pub(crate) const CPU_CORES_MAX: i64 = 8;
pub(crate) const CPU_CORES_DEFAULT: i64 = 1;

pub(crate) const DURATION_MIN: i64 = 5;
pub(crate) const DURATION_MAX: i64 = 300;
pub(crate) const DURATION_DEFAULT: i64 = 30;

pub(crate) const MEMORY_MIN: i64 = 0;
pub(crate) const MEMORY_MAX: i64 = 500;
pub(crate) const MEMORY_DEFAULT: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Health,
    Info,
    Stress,
}

impl Action {
    /// Anything that is not a known action runs the stress branch.
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("health") => Action::Health,
            Some("info") => Action::Info,
            _ => Action::Stress,
        }
    }
}

/// Parameters of a request, always within their bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StressRequest {
    pub(crate) cpu_cores: u32,
    pub(crate) duration_seconds: u32,
    pub(crate) memory_megabytes: u32,
    pub(crate) action: Action,
}

impl StressRequest {
    pub(crate) fn from_raw(
        cpu: Option<&str>,
        duration: Option<&str>,
        memory: Option<&str>,
        action: Option<&str>,
    ) -> Self {
        StressRequest {
            cpu_cores: bounded(cpu, CPU_CORES_DEFAULT, CPU_CORES_MIN, CPU_CORES_MAX),
            duration_seconds: bounded(duration, DURATION_DEFAULT, DURATION_MIN, DURATION_MAX),
            memory_megabytes: bounded(memory, MEMORY_DEFAULT, MEMORY_MIN, MEMORY_MAX),
            action: Action::parse(action),
        }
    }

    pub(crate) fn parameters(&self) -> StressParameters {
        StressParameters {
            cpu_cores: self.cpu_cores,
            duration: self.duration_seconds,
            memory_mb: self.memory_megabytes,
        }
    }
}

fn bounded(raw: Option<&str>, default: i64, min: i64, max: i64) -> u32 {
    let value = raw.and_then(parse_leading_int).unwrap_or(default);

    // bounds are small and non-negative
    value.clamp(min, max) as u32
}

/// Reads an optional sign followed by digits, ignoring whatever trails them.
/// Returns `None` when there is no digit to read. Overflow saturates.
pub(crate) fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);

    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StressParameters {
    pub cpu_cores: u32,
    pub duration: u32,
    pub memory_mb: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StressResponse {
    pub hostname: String,
    pub timestamp: String,
    pub action: Action,
    pub parameters: StressParameters,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Health {
        status: String,
        uptime: Option<f64>,
    },
    Info {
        system_info: SystemSnapshot,
    },
    Stress {
        message: String,
        execution_time: u64,
        status: String,
    },
}
