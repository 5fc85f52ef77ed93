//! Test fixtures, mock collaborators and proptest strategies for grmhd
//! development.
//!
//! Only for use from integration tests (`tests/` directories): crates that
//! this one depends on cannot use it from their own unit tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod mocks;
pub mod strategies;

pub use fixtures::{
    bounds, concrete_state, container_from_fn, driver_config, eos, periodic_mesh, uniform_container, GAMMA,
};
pub use mocks::{
    DeadExchange, DelayedExchange, FrozenRecovery, RecordingBoundary, RecordingTasks, TaggingRefinement,
};
pub use strategies::{direction, flux_arrays, primitive_state};
