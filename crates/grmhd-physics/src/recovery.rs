//! Conserved-to-primitive recovery interface.

use grmhd_core::Geometry;
use grmhd_mesh::Container;

use crate::eos::EquationOfState;

/// Restores primitive/conserved lockstep after a stage update.
///
/// Called once per sub-stage on the freshly updated container, after its
/// ghost zones are filled. Implementations recover `prims` from `cons`
/// over the entire domain and report the zones where recovery failed;
/// failed zones are left for a floor/fixup pass outside this workspace.
pub trait PrimitiveRecovery: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Recover primitives in place. Returns the number of failed zones.
    fn recover(&self, c: &mut Container, geom: &dyn Geometry, eos: &dyn EquationOfState) -> usize;
}
