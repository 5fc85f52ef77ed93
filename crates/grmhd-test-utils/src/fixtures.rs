//! Patch and mesh fixtures.
//!
//! - [`concrete_state`]: the uniform magnetised fluid at rest used by the
//!   end-to-end scenarios.
//! - [`uniform_container`] / [`container_from_fn`]: a base container with
//!   primitives and matching conserved variables over the entire patch.
//! - [`periodic_mesh`]: a periodic block layout with one setup per patch,
//!   sampled from a global primitive profile.

use std::sync::Arc;

use grmhd_core::{Geometry, Minkowski, StateVector};
use grmhd_driver::{DriverConfig, PatchSetup};
use grmhd_mesh::{CellBounds, Container, MeshLayout};
use grmhd_physics::{prims_to_cons, GammaLaw};

/// Adiabatic index used by the fixtures.
pub const GAMMA: f64 = 4.0 / 3.0;

/// Density 1, internal energy 1, at rest, field `(0, 0.5, 0)`.
pub fn concrete_state() -> StateVector {
    StateVector::primitive(1.0, 1.0, [0.0; 3], [0.0, 0.5, 0.0])
}

/// Gamma-law EOS with [`GAMMA`].
pub fn eos() -> GammaLaw {
    match GammaLaw::new(GAMMA) {
        Ok(eos) => eos,
        Err(e) => panic!("fixture adiabatic index rejected: {e}"),
    }
}

/// Patch bounds, panicking on invalid sizes.
pub fn bounds(nx: [usize; 3], ng: usize) -> CellBounds {
    CellBounds::new(nx, ng).unwrap_or_else(|e| panic!("fixture bounds rejected: {e}"))
}

/// Base container whose every zone, halo included, holds `prims` and the
/// matching conserved state.
pub fn uniform_container(bounds: CellBounds, geom: &dyn Geometry, prims: StateVector) -> Container {
    container_from_fn(bounds, geom, |_, _, _| prims)
}

/// Base container with primitives `f(k, j, i)` over the entire patch and
/// the matching conserved state.
pub fn container_from_fn(
    bounds: CellBounds,
    geom: &dyn Geometry,
    mut f: impl FnMut(usize, usize, usize) -> StateVector,
) -> Container {
    let mut c = Container::new("base", bounds);
    for (k, j, i) in bounds.entire().iter() {
        c.prims.set_state(k, j, i, &f(k, j, i));
    }
    let entire = bounds.entire();
    prims_to_cons(&mut c, geom, &eos(), &entire);
    c
}

/// Driver configuration with [`GAMMA`], the given integrator name and a
/// small poll horizon.
pub fn driver_config(integrator: &str) -> DriverConfig {
    let mut cfg = DriverConfig::new(GAMMA);
    cfg.integrator = integrator
        .parse()
        .unwrap_or_else(|e| panic!("fixture integrator rejected: {e}"));
    cfg.max_polls = 64;
    cfg
}

/// Periodic layout of `npatch` patches, each `nx` interior zones with `ng`
/// ghosts and flat zones of width `dx`.
///
/// `profile(gk, gj, gi)` gives the primitive state at global interior zone
/// `(gk, gj, gi)`; ghost zones are left as whatever the profile gives for
/// their (clamped) global position and are refilled by the driver.
pub fn periodic_mesh(
    npatch: [usize; 3],
    nx: [usize; 3],
    ng: usize,
    dx: f64,
    profile: impl Fn(usize, usize, usize) -> StateVector,
) -> (MeshLayout, Vec<PatchSetup>) {
    let b = bounds(nx, ng);
    let layout = MeshLayout::new(npatch, [true; 3], b).unwrap_or_else(|e| panic!("fixture layout rejected: {e}"));
    let geometry: Arc<dyn Geometry> = Arc::new(Minkowski::uniform(dx));

    let setups = layout
        .patches()
        .map(|id| {
            let [p1, p2, p3] = layout.position(id);
            let global = |local: usize, p: usize, n: usize| (p * n + local).saturating_sub(ng);
            let base = container_from_fn(b, geometry.as_ref(), |k, j, i| {
                profile(global(k, p3, nx[2]), global(j, p2, nx[1]), global(i, p1, nx[0]))
            });
            PatchSetup {
                geometry: Arc::clone(&geometry),
                base,
            }
        })
        .collect();
    (layout, setups)
}
