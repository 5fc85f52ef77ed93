//! Benchmark profiles for the grmhd flux core.
//!
//! - [`wave_state`]: a smooth, divergence-free magnetised profile
//! - [`profile_container`]: `n^3` zones carrying that profile
//! - [`reference_container`]: 32x32x32 zones
//! - [`stress_container`]: 64x64x64 zones, 8x the zone count

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::f64::consts::TAU;

use grmhd_core::{Minkowski, StateVector};
use grmhd_mesh::{CellBounds, Container, MeshError};
use grmhd_physics::{prims_to_cons, GammaLaw};

/// Adiabatic index of the benchmark fluid.
pub const GAMMA: f64 = 13.0 / 9.0;

/// Ghost zones per side in every profile.
pub const GHOSTS: usize = 2;

/// Primitive state at global zone `(k, j, i)` of an `n`-zone periodic box.
///
/// `B1` varies only along X2 and `B2` only along X1, so the corner
/// divergence vanishes.
pub fn wave_state(n: usize, k: usize, j: usize, i: usize) -> StateVector {
    let x = TAU * i as f64 / n as f64;
    let y = TAU * j as f64 / n as f64;
    let z = TAU * k as f64 / n as f64;
    StateVector::primitive(
        1.0 + 0.2 * (x + y).sin(),
        1.0 + 0.1 * z.cos(),
        [0.3 * y.sin(), 0.3 * x.cos(), 0.1 * (x + y).cos()],
        [0.4 * y.cos(), 0.4 * x.sin(), 0.2],
    )
}

/// Flat geometry of an `n`-zone unit box.
pub fn geometry(n: usize) -> Minkowski {
    Minkowski::uniform(1.0 / n as f64)
}

/// Base container of `n^3` zones filled with [`wave_state`] over the
/// entire patch, conserved variables included.
pub fn profile_container(n: usize, eos: &GammaLaw) -> Result<Container, MeshError> {
    let bounds = CellBounds::new([n; 3], GHOSTS)?;
    let mut c = Container::new("base", bounds);
    for (k, j, i) in bounds.entire().iter() {
        let wrap = |z: usize| (z + n - GHOSTS) % n;
        c.prims.set_state(k, j, i, &wave_state(n, wrap(k), wrap(j), wrap(i)));
    }
    let entire = bounds.entire();
    prims_to_cons(&mut c, &geometry(n), eos, &entire);
    Ok(c)
}

/// 32x32x32 zone reference profile.
pub fn reference_container(eos: &GammaLaw) -> Result<Container, MeshError> {
    profile_container(32, eos)
}

/// 64x64x64 zone stress profile.
pub fn stress_container(eos: &GammaLaw) -> Result<Container, MeshError> {
    profile_container(64, eos)
}
