use std::sync::Mutex;
use sysinfo::System;
use crate::loggers::core::Usage;

/// Host CPU and memory utilization, sampled on demand.
///
/// CPU usage is computed between two refreshes, so the first sample after
/// construction may read 0.
pub struct SystemSampler {
    sys: Mutex<System>,
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        Self { sys: Mutex::new(sys) }
    }

    pub fn sample(&self) -> Usage {
        let mut sys = self.sys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sys.refresh_cpu();
        sys.refresh_memory();

        let cpu = sys.global_cpu_info().cpu_usage();
        let total = sys.total_memory();
        let memory = if total == 0 {
            0.0
        } else {
            (sys.used_memory() as f64 / total as f64 * 100.0) as f32
        };

        Usage {
            cpu: clamp_percent(cpu),
            memory: clamp_percent(memory),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 100.0) } else { 0.0 }
}
