//! Core types for the grmhd flux core.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: the
//! primitive/conserved variable enumeration and its typed state vector,
//! the direction selector with its unit-offset mapping, the read-only
//! spacetime [`Geometry`] capability, identifiers, and parameter errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod error;
pub mod geometry;
pub mod id;
pub mod var;

pub use direction::{Direction, FluxSelector, Loci, Offset};
pub use error::ParameterError;
pub use geometry::{dot, lower, Connection, Geometry, Minkowski, Tensor2, Vec4};
pub use id::{PatchId, StepId};
pub use var::{StateVector, Var, NPRIM};
