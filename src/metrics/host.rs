use std::fs;
use std::path::Path;

use sysinfo::System;

use crate::api::dto::system::SystemSnapshot;
use crate::metrics::{round2, HostMetricsProvider};

const PROC_UPTIME: &str = "/proc/uptime";
const CGROUP_V2_MEMORY_MAX: &str = "/sys/fs/cgroup/memory.max";
const CGROUP_V1_MEMORY_LIMIT: &str = "/sys/fs/cgroup/memory/memory.limit_in_bytes";

/// cgroup v1 reports "no limit" as a page-aligned i64::MAX.
const CGROUP_V1_UNLIMITED_THRESHOLD: u64 = 1 << 62;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reads the live host through `sysinfo` and the cgroup filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SysinfoHostMetrics;

impl SysinfoHostMetrics {
    fn refreshed(memory: bool, cpu: bool, process: bool) -> System {
        let mut sys = System::new();

        if memory {
            sys.refresh_memory();
        }
        if cpu {
            sys.refresh_cpu();
        }
        if process {
            if let Ok(pid) = sysinfo::get_current_pid() {
                sys.refresh_process(pid);
            }
        }

        sys
    }
}

impl HostMetricsProvider for SysinfoHostMetrics {
    fn hostname(&self) -> Option<String> {
        System::host_name()
    }

    fn load_average(&self) -> Option<[f64; 3]> {
        if cfg!(target_os = "windows") {
            return None;
        }

        let load = System::load_average();
        Some([load.one, load.five, load.fifteen])
    }

    fn memory_total_mb(&self) -> Option<u64> {
        memory_total_mb(&Self::refreshed(true, false, false))
    }

    fn memory_available_mb(&self) -> Option<u64> {
        memory_available_mb(&Self::refreshed(true, false, false))
    }

    fn cpu_core_count(&self) -> Option<usize> {
        cpu_core_count(&Self::refreshed(false, true, false))
    }

    fn uptime_seconds(&self) -> Option<f64> {
        if let Some(uptime) = fs::read_to_string(PROC_UPTIME)
            .ok()
            .and_then(|content| parse_proc_uptime(&content))
        {
            return Some(uptime);
        }

        match System::uptime() {
            0 => None,
            seconds => Some(seconds as f64),
        }
    }

    fn process_memory_usage_mb(&self) -> Option<f64> {
        process_memory_usage_mb(&Self::refreshed(false, false, true))
    }

    fn process_memory_limit(&self) -> Option<String> {
        [CGROUP_V2_MEMORY_MAX, CGROUP_V1_MEMORY_LIMIT]
            .iter()
            .map(Path::new)
            .filter_map(|path| fs::read_to_string(path).ok())
            .find_map(|raw| parse_cgroup_limit(&raw))
    }

    /// One `System` refreshed once serves every field.
    fn snapshot(&self) -> SystemSnapshot {
        let sys = Self::refreshed(true, true, true);

        SystemSnapshot {
            load_average: self.load_average(),
            memory_total_mb: memory_total_mb(&sys),
            memory_available_mb: memory_available_mb(&sys),
            cpu_core_count: cpu_core_count(&sys),
            process_memory_limit: self.process_memory_limit(),
            process_memory_usage_mb: process_memory_usage_mb(&sys),
        }
    }
}

fn memory_total_mb(sys: &System) -> Option<u64> {
    non_zero_mb(sys.total_memory())
}

fn memory_available_mb(sys: &System) -> Option<u64> {
    if sys.total_memory() == 0 {
        return None;
    }

    Some((sys.available_memory() as f64 / BYTES_PER_MB).round() as u64)
}

fn cpu_core_count(sys: &System) -> Option<usize> {
    match sys.cpus().len() {
        0 => None,
        count => Some(count),
    }
}

fn process_memory_usage_mb(sys: &System) -> Option<f64> {
    let pid = sysinfo::get_current_pid().ok()?;

    sys.process(pid)
        .map(|process| round2(process.memory() as f64 / BYTES_PER_MB))
}

fn non_zero_mb(bytes: u64) -> Option<u64> {
    match bytes {
        0 => None,
        bytes => Some((bytes as f64 / BYTES_PER_MB).round() as u64),
    }
}

/// First field of `/proc/uptime`, rounded to two decimals.
pub(crate) fn parse_proc_uptime(content: &str) -> Option<f64> {
    content
        .split_whitespace()
        .next()
        .and_then(|field| field.parse::<f64>().ok())
        .map(round2)
}

/// Turns a cgroup memory limit file into `"<N>M"` or `"unlimited"`.
pub(crate) fn parse_cgroup_limit(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if raw == "max" {
        return Some("unlimited".to_string());
    }

    let bytes = raw.parse::<u64>().ok()?;
    if bytes >= CGROUP_V1_UNLIMITED_THRESHOLD {
        return Some("unlimited".to_string());
    }

    Some(format!("{}M", bytes / 1024 / 1024))
}
