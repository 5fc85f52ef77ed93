//! Reconstruction of face states from zone-centred primitives.

use grmhd_core::Direction;
use grmhd_mesh::{CellBounds, GridArray};

/// Primitive states at the two edges of every zone along one direction.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceStates {
    /// State on the low edge of each zone (right state of its low face).
    pub low: GridArray,
    /// State on the high edge of each zone (left state of its high face).
    pub high: GridArray,
}

/// Produces left/right face states for the flux assembler.
///
/// Must fill at least the zones `interior.grow(2)` along `dir` and
/// `interior.grow(1)` transverse to it; the assembler reads nothing else.
pub trait Reconstruction: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Edge states of every zone along `dir`.
    fn reconstruct(&self, prims: &GridArray, dir: Direction, bounds: &CellBounds) -> FaceStates;
}

/// First-order reconstruction: both edges carry the zone average.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DonorCell;

impl Reconstruction for DonorCell {
    fn name(&self) -> &str {
        "donor_cell"
    }

    fn reconstruct(&self, prims: &GridArray, _dir: Direction, _bounds: &CellBounds) -> FaceStates {
        FaceStates {
            low: prims.clone(),
            high: prims.clone(),
        }
    }
}
