//! TelemetrySampler - host resource snapshots
//!
//! ## Responsibilities
//!
//! - Rolling CPU usage from aggregate tick deltas
//! - Memory and root-volume disk usage in rounded GB
//! - Host uptime passthrough
//!
//! Telemetry is best-effort: it must never fail the request it serves, so
//! every sampling or read failure degrades to zero-valued fields.

use serde::Serialize;
use sysinfo::{Disks, System};
use tokio::sync::Mutex;

/// Aggregate CPU tick counts, averaged per core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTicks {
    pub idle: u64,
    pub total: u64,
}

/// Used/total/percent triple for memory and disk, GB base-1024
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceStats {
    pub used: u64,
    pub total: u64,
    #[serde(rename = "usedPercent")]
    pub used_percent: u8,
}

impl ResourceStats {
    pub const ZERO: ResourceStats = ResourceStats {
        used: 0,
        total: 0,
        used_percent: 0,
    };
}

/// TelemetrySampler instance
///
/// Holds the previous CPU tick sample; the mutex serializes concurrent
/// first calls so only one of them establishes the baseline.
#[derive(Default)]
pub struct TelemetrySampler {
    cpu_baseline: Mutex<Option<CpuTicks>>,
}

impl TelemetrySampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU usage percentage in [0, 100].
    ///
    /// The first call stores a baseline and returns 0; later calls return
    /// the usage over the interval since the previous call and replace the
    /// baseline. Shorter intervals mean smaller tick deltas and more
    /// volatile readings.
    pub async fn cpu_usage_percent(&self) -> u8 {
        let Some(current) = sample_cpu_ticks() else {
            tracing::warn!("CPU tick sampling unavailable, reporting 0");
            return 0;
        };
        self.cpu_percent_from_sample(current).await
    }

    async fn cpu_percent_from_sample(&self, current: CpuTicks) -> u8 {
        let mut baseline = self.cpu_baseline.lock().await;
        let percent = match *baseline {
            Some(prev) => usage_percent(prev, current),
            None => 0,
        };
        *baseline = Some(current);
        percent
    }

    /// Memory usage, used = total - free
    pub fn memory_stats(&self) -> ResourceStats {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return ResourceStats::ZERO;
        }
        let used = total.saturating_sub(sys.free_memory());

        ResourceStats {
            used: bytes_to_gb(used),
            total: bytes_to_gb(total),
            used_percent: percent_used(used, total),
        }
    }

    /// Root-volume disk usage via the platform filesystem statistics
    pub fn disk_stats(&self) -> ResourceStats {
        let disks = Disks::new_with_refreshed_list();
        let root = disks
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"));

        let Some(root) = root else {
            tracing::warn!("root volume not found, reporting zero disk stats");
            return ResourceStats::ZERO;
        };

        let total = root.total_space();
        if total == 0 {
            return ResourceStats::ZERO;
        }
        let used = total.saturating_sub(root.available_space());

        ResourceStats {
            used: bytes_to_gb(used),
            total: bytes_to_gb(total),
            used_percent: percent_used(used, total),
        }
    }

    /// Host uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        System::uptime()
    }
}

/// Usage percentage over a tick interval, clamped to [0, 100].
///
/// A zero total delta (stub clocks, duplicate samples) reports 0 rather
/// than dividing by zero.
fn usage_percent(prev: CpuTicks, current: CpuTicks) -> u8 {
    let total_delta = current.total.saturating_sub(prev.total);
    if total_delta == 0 {
        return 0;
    }
    let idle_delta = current.idle.saturating_sub(prev.idle);

    let used = 100.0 - 100.0 * idle_delta as f64 / total_delta as f64;
    used.round().clamp(0.0, 100.0) as u8
}

/// Bytes to GB, base-1024, rounded to nearest
fn bytes_to_gb(bytes: u64) -> u64 {
    (bytes as f64 / (1024.0 * 1024.0 * 1024.0)).round() as u64
}

fn percent_used(used: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (used as f64 / total as f64 * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Aggregate CPU ticks from /proc/stat, averaged per core
#[cfg(target_os = "linux")]
fn sample_cpu_ticks() -> Option<CpuTicks> {
    use procfs::CurrentSI;

    let stat = procfs::KernelStats::current().ok()?;
    let cpu = &stat.total;

    let idle = cpu.idle;
    let total = cpu.user
        + cpu.nice
        + cpu.system
        + cpu.idle
        + cpu.iowait.unwrap_or(0)
        + cpu.irq.unwrap_or(0)
        + cpu.softirq.unwrap_or(0)
        + cpu.steal.unwrap_or(0);

    let cores = stat.cpu_time.len().max(1) as u64;

    Some(CpuTicks {
        idle: idle / cores,
        total: total / cores,
    })
}

#[cfg(not(target_os = "linux"))]
fn sample_cpu_ticks() -> Option<CpuTicks> {
    None
}
