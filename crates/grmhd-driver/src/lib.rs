//! Stage task graphs and the step driver for the grmhd flux core.
//!
//! [`DriverConfig`] is read from a block/key [`ParameterInput`] and
//! validated up front. [`HarmDriver`] then owns one [`PatchState`] per
//! patch of a [`MeshLayout`](grmhd_mesh::MeshLayout) and advances them
//! together, one task region per integrator stage. Patches exchange ghost
//! zones and shared-face fluxes through a [`BoundaryExchange`]; the
//! default transport is [`ChannelExchange`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundaries;
pub mod config;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod integrator;
pub mod metrics;
pub mod params;
pub mod patch;
pub mod refinement;
pub mod stage;

pub use boundaries::{BoundaryFace, CustomBoundary, Outflow, PhysicalBoundary};
pub use config::{DriverConfig, Packages, DEFAULT_CFL, DEFAULT_MAX_POLLS};
pub use driver::{HarmDriver, PatchSetup};
pub use error::{ConfigError, DriverError, TaskFault};
pub use exchange::{BoundaryExchange, ChannelExchange, Message, MessageKind, MessageTag};
pub use integrator::IntegratorKind;
pub use metrics::StepMetrics;
pub use params::ParameterInput;
pub use patch::{Collaborators, PatchState};
pub use refinement::{AmrTag, NoRefinement, Refinement};
pub use stage::{build_initial, build_stage, HarmTasks, StagePlan};
