//! Flux divergence, geometric source term, stage update and timestep.

use grmhd_core::{Direction, FluxSelector, Geometry, Loci, StateVector, Var, NPRIM};
use grmhd_mesh::{CellBounds, Container, GridArray, IndexBox};
use rayon::prelude::*;
use tracing::trace;

use crate::eos::EquationOfState;
use crate::state::{get_state, nan_min, prim_to_flux, stress_row, LocalMetric};

/// Zone widths of `geom` as `[dx1, dx2, dx3]`.
pub fn zone_widths(geom: &dyn Geometry) -> [f64; 3] {
    [
        geom.dx(Direction::X1),
        geom.dx(Direction::X2),
        geom.dx(Direction::X3),
    ]
}

/// Overwrite `dudt` over the interior with `-sum_d (F_d(+1) - F_d) / dx_d`.
pub fn flux_divergence(c: &Container, geom: &dyn Geometry, dudt: &mut GridArray) {
    trace!("flux_divergence");
    let dx = zone_widths(geom);
    let zones = c.bounds().interior().zones();

    let rates: Vec<StateVector> = zones
        .par_iter()
        .map(|&(k, j, i)| {
            StateVector::from_fn(|v| {
                let mut acc = 0.0;
                for dir in Direction::ALL {
                    let f = c.flux(dir);
                    let (kh, jh, ih) = dir.offset().ahead(k, j, i);
                    acc -= (f.var(v, kh, jh, ih) - f.var(v, k, j, i)) / dx[dir.index()];
                }
                acc
            })
        })
        .collect();

    for (&(k, j, i), r) in zones.iter().zip(&rates) {
        dudt.set_state(k, j, i, r);
    }
}

/// Add the geometric source `sqrt(-g) T^kap_lam Gamma^lam_{nu kap}` to the
/// energy and momentum rates over the interior.
pub fn source_term(
    c: &Container,
    geom: &dyn Geometry,
    eos: &dyn EquationOfState,
    dudt: &mut GridArray,
) {
    trace!("source_term");
    let zones = c.bounds().interior().zones();

    let sources: Vec<[f64; 4]> = zones
        .par_iter()
        .map(|&(k, j, i)| {
            let p = c.prims.state(k, j, i);
            let m = LocalMetric::at(geom, Loci::Center, k, j, i);
            let d = get_state(&p, &m);
            let conn = geom.conn(k, j, i);
            let t: [[f64; 4]; 4] = std::array::from_fn(|kap| stress_row(&p, &d, eos, kap));

            std::array::from_fn(|nu| {
                let mut s = 0.0;
                for (kap, row) in t.iter().enumerate() {
                    for (lam, t_kl) in row.iter().enumerate() {
                        s += t_kl * conn[lam][nu][kap];
                    }
                }
                m.gdet * s
            })
        })
        .collect();

    let slots = [Var::Uu, Var::U1, Var::U2, Var::U3];
    for (&(k, j, i), s) in zones.iter().zip(&sources) {
        for (v, x) in slots.iter().zip(s) {
            *dudt.get_mut(v.index(), k, j, i) += x;
        }
    }
}

/// Coefficients of one low-storage integrator stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageWeights {
    /// Weight of the step's initial state.
    pub gam0: f64,
    /// Weight of the previous stage's state.
    pub gam1: f64,
    /// Weight of `dt * dU/dt`.
    pub beta: f64,
}

/// `out = gam0 * base + gam1 * prev + beta * dt * dudt` over `region`.
///
/// Only conserved variables are combined; primitives stay stale until
/// recovery runs.
pub fn update_conserved(
    base: &GridArray,
    prev: &GridArray,
    dudt: &GridArray,
    w: StageWeights,
    dt: f64,
    region: &IndexBox,
    out: &mut GridArray,
) {
    trace!(gam0 = w.gam0, gam1 = w.gam1, beta = w.beta, dt, "update_conserved");
    for c in 0..NPRIM {
        for (k, j, i) in region.iter() {
            let x = w.gam0 * base.get(c, k, j, i)
                + w.gam1 * prev.get(c, k, j, i)
                + w.beta * dt * dudt.get(c, k, j, i);
            out.set(c, k, j, i, x);
        }
    }
}

/// Courant-limited timestep of one patch.
///
/// Each interior zone allows `1 / sum_d (ctop_d / dx_d)`, using the speed on
/// its low face. The patch estimate is `cfl` times the smallest zone value,
/// capped at `max_dt`. A patch with no signal anywhere returns `max_dt`.
pub fn estimate_timestep(
    ctop: &GridArray,
    bounds: &CellBounds,
    geom: &dyn Geometry,
    cfl: f64,
    max_dt: f64,
) -> f64 {
    let dx = zone_widths(geom);
    let min_zone = bounds
        .interior()
        .iter()
        .map(|(k, j, i)| {
            let rate: f64 = Direction::ALL
                .iter()
                .map(|d| ctop.get(d.index(), k, j, i) / dx[d.index()])
                .sum();
            1.0 / rate
        })
        .fold(f64::INFINITY, nan_min);
    nan_min(cfl * min_zone, max_dt)
}

/// Fill the conserved variables over `region` from the primitives.
pub fn prims_to_cons(
    c: &mut Container,
    geom: &dyn Geometry,
    eos: &dyn EquationOfState,
    region: &IndexBox,
) {
    for (k, j, i) in region.iter() {
        let p = c.prims.state(k, j, i);
        let m = LocalMetric::at(geom, Loci::Center, k, j, i);
        let d = get_state(&p, &m);
        let u = prim_to_flux(&p, &d, eos, &m, FluxSelector::Conserved);
        c.cons.set_state(k, j, i, &u);
    }
}
