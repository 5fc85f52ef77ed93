//! Constrained transport (flux-CT).
//!
//! Rewrites the magnetic components of the three face-flux arrays from
//! edge-centred EMFs so that the corner-centred divergence of the magnetic
//! update vanishes to round-off, whatever the incoming fluxes are.
//!
//! EMFs live on the zone edges through the low corner of `(k, j, i)`: the
//! edge along X3 for `emf3`, and so on. They are computed over the interior
//! widened by one zone on the high side of every axis, which is exactly
//! what the rewrite pass reads.

use grmhd_core::{Direction, Var};
use grmhd_mesh::{CellBounds, GridArray, IndexBox, IndexRange};
use rayon::prelude::*;
use tracing::trace;

use crate::state::nan_max;

/// Edge-centred electromotive forces, one scalar array per edge direction.
///
/// Scratch data: built and consumed inside one [`flux_ct`] call.
#[derive(Clone, Debug)]
pub struct Emf {
    /// Indexed by [`Direction::index`] of the edge direction.
    pub edges: [GridArray; 3],
}

impl Emf {
    /// Compute the EMFs from the raw fluxes.
    pub fn from_fluxes(fluxes: &[GridArray; 3], bounds: &CellBounds) -> Self {
        let [f1, f2, f3] = fluxes;
        let b1 = Var::B1.index();
        let b2 = Var::B2.index();
        let b3 = Var::B3.index();

        let region = edge_region(bounds);
        let zones = region.zones();
        let values: Vec<[f64; 3]> = zones
            .par_iter()
            .map(|&(k, j, i)| {
                let e1 = 0.25
                    * (f2.get(b3, k, j, i) + f2.get(b3, k - 1, j, i)
                        - f3.get(b2, k, j, i)
                        - f3.get(b2, k, j - 1, i));
                let e2 = -0.25
                    * (f1.get(b3, k, j, i) + f1.get(b3, k - 1, j, i)
                        - f3.get(b1, k, j, i)
                        - f3.get(b1, k, j, i - 1));
                let e3 = 0.25
                    * (f1.get(b2, k, j, i) + f1.get(b2, k, j - 1, i)
                        - f2.get(b1, k, j, i)
                        - f2.get(b1, k, j, i - 1));
                [e1, e2, e3]
            })
            .collect();

        let mut edges = [
            GridArray::zeros(1, bounds),
            GridArray::zeros(1, bounds),
            GridArray::zeros(1, bounds),
        ];
        for (&(k, j, i), e) in zones.iter().zip(&values) {
            for (arr, x) in edges.iter_mut().zip(e) {
                arr.set(0, k, j, i, *x);
            }
        }
        Self { edges }
    }

    #[inline]
    fn e(&self, dir: Direction, k: usize, j: usize, i: usize) -> f64 {
        self.edges[dir.index()].get(0, k, j, i)
    }
}

/// Edges the EMF pass covers: the interior plus one zone on the high side
/// of every axis.
fn edge_region(bounds: &CellBounds) -> IndexBox {
    let int = bounds.interior();
    IndexBox::new(int.k.widen(0, 1), int.j.widen(0, 1), int.i.widen(0, 1))
}

/// New magnetic components `[B1, B2, B3]` of the flux through face
/// `(k, j, i)` normal to `dir`.
fn ct_face(emf: &Emf, dir: Direction, k: usize, j: usize, i: usize) -> [f64; 3] {
    use Direction::{X1, X2, X3};
    match dir {
        X1 => [
            0.0,
            0.5 * (emf.e(X3, k, j, i) + emf.e(X3, k, j + 1, i)),
            -0.5 * (emf.e(X2, k, j, i) + emf.e(X2, k + 1, j, i)),
        ],
        X2 => [
            -0.5 * (emf.e(X3, k, j, i) + emf.e(X3, k, j, i + 1)),
            0.0,
            0.5 * (emf.e(X1, k, j, i) + emf.e(X1, k + 1, j, i)),
        ],
        X3 => [
            0.5 * (emf.e(X2, k, j, i) + emf.e(X2, k, j, i + 1)),
            -0.5 * (emf.e(X1, k, j, i) + emf.e(X1, k, j + 1, i)),
            0.0,
        ],
    }
}

/// Apply flux-CT in place to the three directional flux arrays.
///
/// Must run after all three directions have been assembled and before
/// anything takes their divergence. Only the magnetic components of the
/// interior faces are rewritten; faces further out keep their raw values.
pub fn flux_ct(fluxes: &mut [GridArray; 3], bounds: &CellBounds) {
    trace!("flux_ct");
    let emf = Emf::from_fluxes(fluxes, bounds);

    for dir in Direction::ALL {
        let faces = bounds.interior().faces(dir).zones();
        let values: Vec<[f64; 3]> = faces
            .par_iter()
            .map(|&(k, j, i)| ct_face(&emf, dir, k, j, i))
            .collect();

        let flux = &mut fluxes[dir.index()];
        for (&(k, j, i), b) in faces.iter().zip(&values) {
            flux.set(Var::B1.index(), k, j, i, b[0]);
            flux.set(Var::B2.index(), k, j, i, b[1]);
            flux.set(Var::B3.index(), k, j, i, b[2]);
        }
    }
}

/// Corners whose divergence stencil stays inside the interior.
///
/// The stencil of corner `(k, j, i)` reads zones `k - 1 ..= k` and so on.
pub fn interior_corners(bounds: &CellBounds) -> IndexBox {
    let int = bounds.interior();
    let shrink = |r: IndexRange| IndexRange::new(r.s + 1, r.e.max(r.s + 1));
    IndexBox::new(shrink(int.k), shrink(int.j), shrink(int.i))
}

/// Corner-centred divergence of the magnetic components of `arr` at the
/// low corner of zone `(k, j, i)`.
///
/// Applied to conserved variables this is the usual flux-CT `div B`;
/// applied to a rate of change it is the rate the CT update preserves.
pub fn corner_div_b(arr: &GridArray, dx: [f64; 3], k: usize, j: usize, i: usize) -> f64 {
    let b1 = |k, j, i| arr.get(Var::B1.index(), k, j, i);
    let b2 = |k, j, i| arr.get(Var::B2.index(), k, j, i);
    let b3 = |k, j, i| arr.get(Var::B3.index(), k, j, i);

    0.25 * (b1(k, j, i) + b1(k, j - 1, i) + b1(k - 1, j, i) + b1(k - 1, j - 1, i)
        - b1(k, j, i - 1)
        - b1(k, j - 1, i - 1)
        - b1(k - 1, j, i - 1)
        - b1(k - 1, j - 1, i - 1))
        / dx[0]
        + 0.25
            * (b2(k, j, i) + b2(k, j, i - 1) + b2(k - 1, j, i) + b2(k - 1, j, i - 1)
                - b2(k, j - 1, i)
                - b2(k, j - 1, i - 1)
                - b2(k - 1, j - 1, i)
                - b2(k - 1, j - 1, i - 1))
            / dx[1]
        + 0.25
            * (b3(k, j, i) + b3(k, j, i - 1) + b3(k, j - 1, i) + b3(k, j - 1, i - 1)
                - b3(k - 1, j, i)
                - b3(k - 1, j, i - 1)
                - b3(k - 1, j - 1, i)
                - b3(k - 1, j - 1, i - 1))
            / dx[2]
}

/// Largest `|div B|` over `corners`. NaN if any corner is NaN.
pub fn max_corner_div_b(arr: &GridArray, dx: [f64; 3], corners: &IndexBox) -> f64 {
    corners
        .iter()
        .map(|(k, j, i)| corner_div_b(arr, dx, k, j, i).abs())
        .fold(0.0, nan_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> CellBounds {
        CellBounds::new([3, 4, 2], 2).unwrap()
    }

    #[test]
    fn normal_components_are_zeroed() {
        let b = bounds();
        let mut fluxes = [
            GridArray::zeros(8, &b),
            GridArray::zeros(8, &b),
            GridArray::zeros(8, &b),
        ];
        for f in fluxes.iter_mut() {
            f.fill(1.0);
        }
        flux_ct(&mut fluxes, &b);
        for dir in Direction::ALL {
            for (k, j, i) in b.interior().faces(dir).iter() {
                assert_eq!(fluxes[dir.index()].var(Var::field(dir), k, j, i), 0.0);
            }
        }
    }

    #[test]
    fn uniform_fluxes_give_zero_emf() {
        let b = bounds();
        let mut fluxes = [
            GridArray::zeros(8, &b),
            GridArray::zeros(8, &b),
            GridArray::zeros(8, &b),
        ];
        for f in fluxes.iter_mut() {
            f.fill(0.75);
        }
        let emf = Emf::from_fluxes(&fluxes, &b);
        for (k, j, i) in edge_region(&b).iter() {
            for d in Direction::ALL {
                assert_eq!(emf.e(d, k, j, i), 0.0);
            }
        }
    }

    #[test]
    fn non_magnetic_components_untouched() {
        let b = bounds();
        let mut fluxes = [
            GridArray::zeros(8, &b),
            GridArray::zeros(8, &b),
            GridArray::zeros(8, &b),
        ];
        fluxes[0].set(Var::Rho.index(), 2, 2, 2, 3.0);
        fluxes[1].set(Var::U2.index(), 3, 3, 3, -1.0);
        flux_ct(&mut fluxes, &b);
        assert_eq!(fluxes[0].var(Var::Rho, 2, 2, 2), 3.0);
        assert_eq!(fluxes[1].var(Var::U2, 3, 3, 3), -1.0);
    }

    #[test]
    fn corner_stencil_sees_linear_field() {
        let b = bounds();
        let mut a = GridArray::zeros(8, &b);
        // B = (x, 0, 0) with dx1 = 0.5 has div B = 1.
        for (k, j, i) in b.entire().iter() {
            a.set(Var::B1.index(), k, j, i, 0.5 * i as f64);
        }
        let d = corner_div_b(&a, [0.5, 1.0, 1.0], 3, 3, 3);
        assert!((d - 1.0).abs() < 1e-14);
    }
}
