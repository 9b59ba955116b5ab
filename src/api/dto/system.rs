use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub load_average: Option<[f64; 3]>,
    pub memory_total_mb: Option<u64>,
    pub memory_available_mb: Option<u64>,
    pub cpu_core_count: Option<usize>,
    pub process_memory_limit: Option<String>,
    pub process_memory_usage_mb: Option<f64>,
}
