//! Process resource probes.
//!
//! On Linux the probe reads `/proc/self`; elsewhere it degrades to the
//! zero-reporting [`NullProbe`], which disables throttling rather than
//! guessing.

use driftwatch_core::traits::ResourceProbe;

/// The best probe available on this platform.
pub fn default_probe() -> Box<dyn ResourceProbe> {
    #[cfg(target_os = "linux")]
    {
        Box::new(procfs::ProcfsProbe::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(driftwatch_core::traits::NullProbe)
    }
}

#[cfg(target_os = "linux")]
pub mod procfs {
    use std::time::Instant;

    use driftwatch_core::traits::{ResourceProbe, ResourceSample};

    /// Linux exports USER_HZ = 100 to userspace regardless of the
    /// kernel tick rate.
    const USER_HZ: f64 = 100.0;

    const PAGE_SIZE_BYTES: f64 = 4_096.0;

    /// Samples RSS from `/proc/self/statm` and CPU from the
    /// utime+stime delta in `/proc/self/stat` between consecutive
    /// calls. The first call reports zero CPU (no delta yet).
    pub struct ProcfsProbe {
        last: Option<(Instant, u64)>,
    }

    impl ProcfsProbe {
        pub fn new() -> Self {
            Self { last: None }
        }

        fn memory_mb() -> f64 {
            let Some(content) = std::fs::read_to_string("/proc/self/statm").ok() else {
                return 0.0;
            };
            // statm: size resident shared text lib data dt (pages)
            content
                .split_whitespace()
                .nth(1)
                .and_then(|v| v.parse::<f64>().ok())
                .map(|pages| pages * PAGE_SIZE_BYTES / (1024.0 * 1024.0))
                .unwrap_or(0.0)
        }

        fn cpu_ticks() -> Option<u64> {
            let content = std::fs::read_to_string("/proc/self/stat").ok()?;
            // The comm field may contain spaces; fields are positional
            // only after the closing paren.
            let after_comm = content.rsplit_once(')')?.1;
            let fields: Vec<&str> = after_comm.split_whitespace().collect();
            // After ')': state is field 0, utime is field 11, stime 12.
            let utime: u64 = fields.get(11)?.parse().ok()?;
            let stime: u64 = fields.get(12)?.parse().ok()?;
            Some(utime + stime)
        }
    }

    impl Default for ProcfsProbe {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ResourceProbe for ProcfsProbe {
        fn sample(&mut self) -> ResourceSample {
            let memory_mb = Self::memory_mb();
            let now = Instant::now();

            let cpu_percent = match (Self::cpu_ticks(), self.last) {
                (Some(ticks), Some((last_at, last_ticks))) => {
                    let wall = now.duration_since(last_at).as_secs_f64();
                    self.last = Some((now, ticks));
                    if wall > 0.0 {
                        let cpu_secs = ticks.saturating_sub(last_ticks) as f64 / USER_HZ;
                        (cpu_secs / wall * 100.0).min(100.0 * num_cpus())
                    } else {
                        0.0
                    }
                }
                (Some(ticks), None) => {
                    self.last = Some((now, ticks));
                    0.0
                }
                (None, _) => 0.0,
            };

            ResourceSample {
                cpu_percent,
                memory_mb,
            }
        }
    }

    fn num_cpus() -> f64 {
        std::thread::available_parallelism()
            .map(|n| n.get() as f64)
            .unwrap_or(1.0)
    }

}
