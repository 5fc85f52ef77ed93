//! Patch index spaces, grid storage and field containers.
//!
//! A patch is a rectangular block of zones surrounded by a halo of ghost
//! zones. [`CellBounds`] answers the "interior" and "entire" range queries,
//! [`GridArray`] stores `(component, k, j, i)` data over the entire domain,
//! [`Container`] bundles the arrays of one integration sub-stage, and
//! [`MeshLayout`] places equally sized patches on a regular grid.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod container;
pub mod error;
pub mod index;
pub mod layout;

pub use array::GridArray;
pub use container::{Container, ContainerCollection, BASE_CONTAINER, DUDT_CONTAINER};
pub use error::MeshError;
pub use index::{CellBounds, IndexBox, IndexDomain, IndexRange, MIN_GHOST_ZONES};
pub use layout::{boundary_faces, MeshLayout, Neighbor, NeighborOffset};
