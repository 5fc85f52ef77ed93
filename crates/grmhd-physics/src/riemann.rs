//! Local Lax-Friedrichs flux assembler.
//!
//! For every face in the interior plus one layer of halo, the left state
//! is read one zone behind the face along its normal and the right state
//! at the face's own zone, so the two samples straddle the same face. The
//! shift comes from [`Direction::offset`].

use grmhd_core::{Direction, Geometry, Loci, StateVector};
use grmhd_mesh::{CellBounds, Container, GridArray};
use rayon::prelude::*;
use tracing::trace;

use crate::eos::EquationOfState;
use crate::reconstruction::Reconstruction;
use crate::state::{mhd_calc, nan_max, LocalMetric};

/// Numerical flux and maximal signal speed at one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceFlux {
    /// Blended numerical flux.
    pub flux: StateVector,
    /// Maximal characteristic speed magnitude at the face.
    pub ctop: f64,
}

/// Rusanov flux between left state `pl` and right state `pr` at a face
/// normal to `dir` with metric `m`.
///
/// `ctop = max(|max(0, cmaxL, cmaxR)|, |max(0, -cminL, -cminR)|)` and
/// `F = 0.5 * (F_L + F_R - ctop * (U_R - U_L))`.
pub fn llf_flux(
    pl: &StateVector,
    pr: &StateVector,
    eos: &dyn EquationOfState,
    m: &LocalMetric,
    dir: Direction,
) -> FaceFlux {
    let l = mhd_calc(pl, eos, m, dir);
    let r = mhd_calc(pr, eos, m, dir);

    let cmax = nan_max(nan_max(0.0, l.speeds.cmax), r.speeds.cmax).abs();
    let cmin = nan_max(nan_max(0.0, -l.speeds.cmin), -r.speeds.cmin).abs();
    let ctop = nan_max(cmax, cmin);

    let flux = StateVector::from_fn(|v| 0.5 * (l.flux[v] + r.flux[v] - ctop * (r.cons[v] - l.cons[v])));
    FaceFlux { flux, ctop }
}

/// Fill `flux` and component `dir` of `ctop` for every face normal to
/// `dir` over the interior grown by one zone.
///
/// `pl` holds, per zone, the state on that zone's high edge; `pr` the state
/// on its low edge. The face at `(k, j, i)` therefore pairs `pl` one zone
/// behind with `pr` at the zone itself.
#[allow(clippy::too_many_arguments)]
pub fn lr_to_flux(
    pl: &GridArray,
    pr: &GridArray,
    dir: Direction,
    bounds: &CellBounds,
    geom: &dyn Geometry,
    eos: &dyn EquationOfState,
    flux: &mut GridArray,
    ctop: &mut GridArray,
) {
    trace!(%dir, "lr_to_flux");
    let off = dir.offset();
    let loc = Loci::face(dir);
    let faces = bounds.interior().grow(1).zones();

    let results: Vec<FaceFlux> = faces
        .par_iter()
        .map(|&(k, j, i)| {
            let (kl, jl, il) = off.behind(k, j, i);
            let m = LocalMetric::at(geom, loc, k, j, i);
            llf_flux(&pl.state(kl, jl, il), &pr.state(k, j, i), eos, &m, dir)
        })
        .collect();

    let c = dir.index();
    for (&(k, j, i), f) in faces.iter().zip(&results) {
        flux.set_state(k, j, i, &f.flux);
        ctop.set(c, k, j, i, f.ctop);
    }
}

/// Reconstruct face states from the container's primitives and assemble
/// the fluxes along `dir` into it.
pub fn calculate_flux(
    c: &mut Container,
    dir: Direction,
    geom: &dyn Geometry,
    eos: &dyn EquationOfState,
    recon: &dyn Reconstruction,
) {
    let bounds = *c.bounds();
    let faces = recon.reconstruct(&c.prims, dir, &bounds);
    lr_to_flux(
        &faces.high,
        &faces.low,
        dir,
        &bounds,
        geom,
        eos,
        &mut c.fluxes[dir.index()],
        &mut c.ctop,
    );
}
