use std::fmt;

#[derive(Debug)]
pub enum StressError {
    AllocationFailed { allocated_mb: u32, requested_mb: u32, reason: String },
    WorkerPanicked(usize),
    Other(String),
}

impl fmt::Display for StressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressError::AllocationFailed { allocated_mb, requested_mb, reason } => write!(
                f,
                "Memory allocation failed after {}MB of {}MB: {}",
                allocated_mb, requested_mb, reason
            ),
            StressError::WorkerPanicked(worker) => write!(f, "CPU burn worker {} panicked", worker),
            StressError::Other(msg) => write!(f, "Stress error: {}", msg),
        }
    }
}

impl std::error::Error for StressError {}

impl From<tokio::task::JoinError> for StressError {
    fn from(err: tokio::task::JoinError) -> Self {
        StressError::Other(format!("stress task aborted: {}", err))
    }
}
