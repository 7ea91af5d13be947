use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The three phases of a staffing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Load,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Extract => "extract",
            Phase::Transform => "transform",
            Phase::Load => "load",
        }
    }

    /// What the item count of the phase counts.
    pub fn unit(self) -> &'static str {
        match self {
            Phase::Extract => "LLM responses",
            Phase::Transform => "matched employees",
            Phase::Load => "documents",
        }
    }
}

/// Process usage at the end of a phase, only sampled with monitoring on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub items: usize,
    pub elapsed: Duration,
    pub sample: Option<ProcessSample>,
}

/// Per-phase timing and item counts of one run, plus process usage when
/// enabled and the `cli` feature brings in sysinfo.
pub struct SystemMonitor {
    enabled: bool,
    started: Instant,
    phase_started: Mutex<Instant>,
    reports: Mutex<Vec<PhaseReport>>,
    #[cfg(feature = "cli")]
    process: Option<process::ProcessProbe>,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            phase_started: Mutex::new(now),
            reports: Mutex::new(Vec::new()),
            #[cfg(feature = "cli")]
            process: if enabled {
                process::ProcessProbe::new()
            } else {
                None
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Close `phase` with the number of items it produced.
    pub fn record(&self, phase: Phase, items: usize) -> PhaseReport {
        let now = Instant::now();
        let elapsed = match self.phase_started.lock() {
            Ok(mut started) => {
                let elapsed = now.duration_since(*started);
                *started = now;
                elapsed
            }
            Err(_) => Duration::ZERO,
        };

        let report = PhaseReport {
            phase,
            items,
            elapsed,
            sample: self.sample(),
        };

        match &report.sample {
            Some(sample) => tracing::info!(
                "📊 {} - {} {} in {:?}, CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
                phase.label(),
                items,
                phase.unit(),
                elapsed,
                sample.cpu_usage,
                sample.memory_usage_mb,
                sample.peak_memory_mb
            ),
            None => tracing::debug!(
                "⏱️ {} - {} {} in {:?}",
                phase.label(),
                items,
                phase.unit(),
                elapsed
            ),
        }

        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
        report
    }

    pub fn reports(&self) -> Vec<PhaseReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        let reports = self.reports();
        let phases: Vec<String> = reports
            .iter()
            .map(|report| format!("{}={}", report.phase.label(), report.items))
            .collect();
        let peak = reports
            .iter()
            .filter_map(|report| report.sample.map(|sample| sample.peak_memory_mb))
            .max();

        match peak {
            Some(peak) => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Items: {}",
                self.started.elapsed(),
                peak,
                phases.join(", ")
            ),
            None => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Items: {}",
                self.started.elapsed(),
                phases.join(", ")
            ),
        }
    }

    #[cfg(feature = "cli")]
    fn sample(&self) -> Option<ProcessSample> {
        self.process.as_ref()?.sample()
    }

    #[cfg(not(feature = "cli"))]
    fn sample(&self) -> Option<ProcessSample> {
        None
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(feature = "cli")]
mod process {
    use super::ProcessSample;
    use std::sync::Mutex;
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

    pub struct ProcessProbe {
        system: Mutex<System>,
        pid: Pid,
        peak_memory_mb: Mutex<u64>,
    }

    impl ProcessProbe {
        pub fn new() -> Option<Self> {
            let pid = match sysinfo::get_current_pid() {
                Ok(pid) => pid,
                Err(e) => {
                    tracing::warn!("System monitoring unavailable: {}", e);
                    return None;
                }
            };

            Some(Self {
                system: Mutex::new(System::new()),
                pid,
                peak_memory_mb: Mutex::new(0),
            })
        }

        pub fn sample(&self) -> Option<ProcessSample> {
            let mut system = self.system.lock().ok()?;
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[self.pid]),
                true,
                ProcessRefreshKind::everything(),
            );

            let process = system.process(self.pid)?;
            let memory_mb = process.memory() / 1024 / 1024;

            // 峰值記憶體
            let mut peak = self.peak_memory_mb.lock().ok()?;
            *peak = (*peak).max(memory_mb);

            Some(ProcessSample {
                cpu_usage: process.cpu_usage(),
                memory_usage_mb: memory_mb,
                peak_memory_mb: *peak,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_still_counts_items() {
        let monitor = SystemMonitor::new(false);

        monitor.record(Phase::Extract, 2);
        monitor.record(Phase::Transform, 3);

        let reports = monitor.reports();
        assert!(!monitor.is_enabled());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].phase, Phase::Transform);
        assert_eq!(reports[1].items, 3);
        assert!(reports.iter().all(|report| report.sample.is_none()));
    }

    #[test]
    fn test_phase_units() {
        assert_eq!(Phase::Load.label(), "load");
        assert_eq!(Phase::Transform.unit(), "matched employees");
    }
}
