//! Error types for configuration and the step driver.

use grmhd_core::{ParameterError, PatchId};
use grmhd_mesh::MeshError;
use grmhd_tasks::{SchedulerError, TaskListError};
use thiserror::Error;

/// Errors detected while reading or validating a [`DriverConfig`](crate::DriverConfig).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A parameter was missing, malformed or physically invalid.
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),

    /// Courant factor outside `(0, 1]`.
    #[error("cfl must be in (0, 1], got {value}")]
    InvalidCfl {
        /// The rejected value.
        value: f64,
    },

    /// Timestep cap that is not positive.
    #[error("max_dt must be positive, got {value}")]
    InvalidMaxDt {
        /// The rejected value.
        value: f64,
    },

    /// Every base physics package is disabled.
    #[error("no base physics package enabled (set Packages/GRMHD = true)")]
    NoBasePackage,

    /// A package was enabled that this build does not provide.
    #[error("package '{name}' is not supported")]
    UnsupportedPackage {
        /// The package name as it appears under `Packages/`.
        name: &'static str,
    },

    /// A scheduler poll horizon of zero.
    #[error("scheduler poll horizon must be positive")]
    ZeroPollHorizon,

    /// `Driver/integrator` names no known scheme.
    #[error("unknown integrator '{name}', expected rk1, rk2 or rk3")]
    UnknownIntegrator {
        /// The rejected name.
        name: String,
    },
}

/// A fault recorded by a task on one patch.
///
/// Tasks cannot fail; a task that hits one of these records it on its
/// patch and stays incomplete, and the driver reports it once the stage
/// stops making progress.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TaskFault {
    /// A container lookup or borrow failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The receiving end of a neighbour's channel is gone.
    #[error("patch {peer} is no longer receiving")]
    Disconnected {
        /// The unreachable neighbour.
        peer: PatchId,
    },

    /// A message did not have the size of the region it fills.
    #[error("message from patch {from} has {got} values, expected {expected}")]
    PayloadSize {
        /// The sender.
        from: PatchId,
        /// Values the region needs.
        expected: usize,
        /// Values received.
        got: usize,
    },
}

/// Errors from building or stepping a [`HarmDriver`](crate::HarmDriver).
#[derive(Debug, Error)]
pub enum DriverError {
    /// Configuration was rejected.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// A patch or container operation failed outside any task.
    #[error("mesh: {0}")]
    Mesh(#[from] MeshError),

    /// A stage task list could not be built.
    #[error("task list: {0}")]
    TaskList(#[from] TaskListError),

    /// A stage did not complete within the poll horizon.
    #[error("scheduler: {0}")]
    Scheduler(#[from] SchedulerError),

    /// A task on one patch faulted and stopped the stage.
    #[error("patch {patch}: {source}")]
    PatchFault {
        /// The faulting patch.
        patch: PatchId,
        /// What went wrong.
        source: TaskFault,
    },

    /// The number of patch setups differs from the layout.
    #[error("layout has {expected} patches, got {got} setups")]
    PatchCount {
        /// Patches in the layout.
        expected: usize,
        /// Setups supplied.
        got: usize,
    },

    /// A patch's base container does not have the layout's shape.
    #[error("patch {patch} does not match the layout's cell bounds")]
    BoundsMismatch {
        /// The offending patch.
        patch: PatchId,
    },

    /// The timestep estimate is not a positive finite number.
    #[error("invalid timestep {dt}")]
    InvalidTimestep {
        /// The rejected estimate.
        dt: f64,
    },
}
