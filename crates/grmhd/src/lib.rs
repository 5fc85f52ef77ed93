//! grmhd: the flux core of an ideal general-relativistic MHD solver.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all grmhd sub-crates. For most users, adding `grmhd` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use grmhd::prelude::*;
//! use grmhd::mesh::CellBounds;
//! use grmhd::physics::prims_to_cons;
//!
//! // Recovery that leaves the primitives untouched.
//! struct Frozen;
//! impl PrimitiveRecovery for Frozen {
//!     fn name(&self) -> &str { "frozen" }
//!     fn recover(&self, _: &mut Container, _: &dyn Geometry, _: &dyn EquationOfState) -> usize { 0 }
//! }
//!
//! // One periodic 8x8x8 patch of magnetised fluid at rest.
//! let bounds = CellBounds::new([8, 8, 8], 2).unwrap();
//! let geometry = Arc::new(Minkowski::uniform(1.0 / 8.0));
//! let eos = GammaLaw::new(4.0 / 3.0).unwrap();
//! let mut base = Container::new(BASE_CONTAINER, bounds);
//! let state = StateVector::primitive(1.0, 1.0, [0.0; 3], [0.0, 0.5, 0.0]);
//! for (k, j, i) in bounds.entire().iter() {
//!     base.prims.set_state(k, j, i, &state);
//! }
//! prims_to_cons(&mut base, geometry.as_ref(), &eos, &bounds.entire());
//!
//! let mut driver = HarmDriver::new(
//!     DriverConfig::new(4.0 / 3.0),
//!     MeshLayout::single_periodic(bounds),
//!     vec![PatchSetup { geometry, base }],
//!     Collaborators::new(Box::new(Frozen)),
//! )
//! .unwrap();
//! let metrics = driver.step().unwrap();
//! assert_eq!(metrics.failed_recoveries, 0);
//! assert_eq!(driver.step_id(), StepId(1));
//! assert!(driver.max_div_b().unwrap() < 1e-12);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `grmhd-core` | Variables, directions, geometry, IDs |
//! | [`mesh`] | `grmhd-mesh` | Index spaces, grid arrays, containers, layouts |
//! | [`physics`] | `grmhd-physics` | EOS, Riemann fluxes, constrained transport, updates |
//! | [`tasks`] | `grmhd-tasks` | Task lists and polled task regions |
//! | [`driver`] | `grmhd-driver` | Parameters, stage graphs, exchange, the step driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary (`grmhd-core`).
///
/// The [`types::Var`] enumeration and [`types::StateVector`], the
/// [`types::Direction`] selector, and the [`types::Geometry`] capability
/// with its flat [`types::Minkowski`] implementation.
pub use grmhd_core as types;

/// Patch index spaces and storage (`grmhd-mesh`).
pub use grmhd_mesh as mesh;

/// Flux computation and constrained transport (`grmhd-physics`).
///
/// The extension points are [`physics::Reconstruction`],
/// [`physics::PrimitiveRecovery`] and [`physics::EquationOfState`].
pub use grmhd_physics as physics;

/// Task-dependency graphs (`grmhd-tasks`).
pub use grmhd_tasks as tasks;

/// Stage graphs and the step driver (`grmhd-driver`).
///
/// [`driver::HarmDriver`] advances every patch of a mesh one step at a
/// time; [`driver::DriverConfig`] is read from a [`driver::ParameterInput`].
pub use grmhd_driver as driver;

/// Common imports for typical grmhd usage.
///
/// ```rust
/// use grmhd::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use grmhd_core::{Direction, Geometry, Minkowski, PatchId, StateVector, StepId, Var, NPRIM};

    // Mesh
    pub use grmhd_mesh::{Container, GridArray, MeshLayout, BASE_CONTAINER};

    // Physics
    pub use grmhd_physics::{DonorCell, EquationOfState, GammaLaw, PrimitiveRecovery, Reconstruction};

    // Driver
    pub use grmhd_driver::{
        Collaborators, DriverConfig, DriverError, HarmDriver, IntegratorKind, ParameterInput, PatchSetup,
        StepMetrics,
    };
}
