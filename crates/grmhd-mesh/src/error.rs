//! Error types for patch and container construction.

use grmhd_core::Direction;
use thiserror::Error;

/// Errors from building patches, containers and mesh layouts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The halo is too thin for the flux stencil.
    #[error("patch needs at least {min} ghost zones, got {ng}")]
    TooFewGhostZones {
        /// Requested ghost-zone count.
        ng: usize,
        /// Smallest supported count.
        min: usize,
    },

    /// A patch has fewer interior zones along `dir` than it has ghost zones.
    #[error("patch has {cells} interior zones along {dir}, need at least {min}")]
    TooFewCells {
        /// Offending direction.
        dir: Direction,
        /// Requested interior zones.
        cells: usize,
        /// Smallest supported count.
        min: usize,
    },

    /// No container with this name is registered.
    #[error("unknown container '{name}'")]
    UnknownContainer {
        /// The name looked up.
        name: String,
    },

    /// A container with this name is already registered.
    #[error("container '{name}' already exists")]
    DuplicateContainer {
        /// The name registered twice.
        name: String,
    },

    /// One container was asked for both read and write access.
    #[error("container '{name}' cannot be read and written at once")]
    AliasedContainer {
        /// The container named twice.
        name: String,
    },

    /// A mesh layout with zero patches along some direction.
    #[error("mesh layout needs at least one patch along {dir}")]
    EmptyLayout {
        /// Offending direction.
        dir: Direction,
    },
}
