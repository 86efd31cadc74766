//! Process resource sampling.

/// One sample of the current process's resource usage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

/// Samples CPU and memory before each scan so the scheduler can defer
/// work instead of competing with the developer's build.
///
/// Mutable receiver: CPU percentages are deltas between consecutive
/// samples, so probes carry state.
pub trait ResourceProbe: Send {
    fn sample(&mut self) -> ResourceSample;
}

/// Probe that reports zero usage. Used on platforms without a real
/// probe implementation; throttling is effectively disabled.
#[derive(Debug, Default)]
pub struct NullProbe;

impl ResourceProbe for NullProbe {
    fn sample(&mut self) -> ResourceSample {
        ResourceSample::default()
    }
}
