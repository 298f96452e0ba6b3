// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host metrics probe backed by sysinfo

use crate::ProbeError;
use sysinfo::{Disks, Networks, System};
use vigil_core::{
    CpuMetrics, DiskMetrics, EpochSecs, LoadAverage, MemoryMetrics, MemoryUsage, MetricSnapshot,
    NetIoCounters, SwapUsage, SystemInfo,
};

/// Source of periodic host metric snapshots.
pub trait MetricsProbe: Send {
    fn sample(&mut self) -> Result<MetricSnapshot, ProbeError>;
}

/// Real metrics probe.
///
/// Keeps the sysinfo handles alive between ticks so CPU usage is the
/// delta since the previous sample; the very first sample reports 0%.
pub struct SysinfoMetricsProbe {
    sys: System,
    disks: Disks,
    networks: Networks,
}

impl SysinfoMetricsProbe {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    fn percent(used: u64, total: u64) -> f32 {
        if total == 0 {
            return 0.0;
        }
        (used as f64 / total as f64 * 100.0) as f32
    }
}

impl Default for SysinfoMetricsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProbe for SysinfoMetricsProbe {
    fn sample(&mut self) -> Result<MetricSnapshot, ProbeError> {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.disks.refresh(true);
        self.networks.refresh(true);

        let load = System::load_average();
        let cpu = CpuMetrics {
            percent: self.sys.global_cpu_usage(),
            per_cpu: self.sys.cpus().iter().map(|cpu| cpu.cpu_usage()).collect(),
            load_average: LoadAverage {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            },
            count_logical: self.sys.cpus().len(),
        };

        let ram_total = self.sys.total_memory();
        let ram_used = self.sys.used_memory();
        let swap_total = self.sys.total_swap();
        let swap_used = self.sys.used_swap();
        let memory = MemoryMetrics {
            ram: MemoryUsage {
                total: ram_total,
                used: ram_used,
                available: self.sys.available_memory(),
                free: self.sys.free_memory(),
                percent: Self::percent(ram_used, ram_total),
            },
            swap: SwapUsage {
                total: swap_total,
                used: swap_used,
                free: swap_total.saturating_sub(swap_used),
                percent: Self::percent(swap_used, swap_total),
            },
        };

        let disk = self
            .disks
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                let free = disk.available_space();
                let used = total.saturating_sub(free);
                DiskMetrics {
                    mount: disk.mount_point().display().to_string(),
                    fstype: Some(disk.file_system().to_string_lossy().to_string()),
                    total,
                    used,
                    free,
                    percent: Self::percent(used, total),
                }
            })
            .collect();

        let mut network = NetIoCounters::default();
        for (_, data) in self.networks.iter() {
            network.bytes_sent += data.total_transmitted();
            network.bytes_recv += data.total_received();
            network.packets_sent += data.total_packets_transmitted();
            network.packets_recv += data.total_packets_received();
            network.errors_in += data.total_errors_on_received();
            network.errors_out += data.total_errors_on_transmitted();
        }

        Ok(MetricSnapshot {
            cpu,
            memory,
            disk,
            network,
            system: SystemInfo {
                hostname: System::host_name(),
                boot_time: System::boot_time() as EpochSecs,
                uptime_seconds: System::uptime(),
            },
        })
    }
}
