#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource usage at the end of one pipeline phase.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    /// Time spent since the previous sample.
    pub phase_time: Duration,
    pub total_time: Duration,
}

#[cfg(feature = "cli")]
struct Samples {
    system: System,
    last_sample: Instant,
    peak_memory_mb: u64,
}

/// Samples this process between extract, transform and load.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    pid: Option<Pid>,
    started: Instant,
    samples: Mutex<Samples>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = enabled.then(sysinfo::get_current_pid).and_then(|pid| pid.ok());
        let now = Instant::now();

        Self {
            pid,
            started: now,
            samples: Mutex::new(Samples {
                system: System::new(),
                last_sample: now,
                peak_memory_mb: 0,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pid.is_some()
    }

    pub fn sample(&self) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut samples = self.samples.lock().ok()?;

        samples.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let (cpu_usage, memory_mb) = {
            let process = samples.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };

        let now = Instant::now();
        let phase_time = now.duration_since(samples.last_sample);
        samples.last_sample = now;
        samples.peak_memory_mb = samples.peak_memory_mb.max(memory_mb);

        Some(PhaseStats {
            cpu_usage,
            memory_mb,
            peak_memory_mb: samples.peak_memory_mb,
            phase_time,
            total_time: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} took {:?} | CPU {:.1}% | Memory {}MB (peak {}MB)",
                phase,
                stats.phase_time,
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Run finished in {:?}, peak memory {}MB",
                stats.total_time,
                stats.peak_memory_mb
            );
        }
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}
}
