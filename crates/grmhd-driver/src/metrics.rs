//! Per-step metrics for the driver.

/// Timing and scheduling counters collected during one step.
///
/// Durations are in microseconds. The driver overwrites these after every
/// `step()`; read them from [`HarmDriver::last_metrics`](crate::HarmDriver::last_metrics).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole step.
    pub total_us: u64,
    /// Wall-clock time per integrator stage, first stage first.
    pub stage_us: Vec<u64>,
    /// Polling rounds across all stages.
    pub polls: u64,
    /// Task invocations that returned incomplete.
    pub incomplete_polls: u64,
    /// Task invocations across all stages.
    pub tasks_run: u64,
    /// Timestep the step advanced by.
    pub dt: f64,
    /// Zones where primitive recovery failed, summed over stages and patches.
    pub failed_recoveries: usize,
}
