//! Read-only spacetime geometry capability.
//!
//! The flux kernel needs the covariant and contravariant metric and the
//! metric determinant at zone centres and faces; the source term needs the
//! connection coefficients at zone centres. All of these are produced
//! outside the core and consumed through [`Geometry`].

use crate::direction::{Direction, Loci};

/// A spacetime four-vector, index 0 is time.
pub type Vec4 = [f64; 4];

/// A rank-2 spacetime tensor `g[mu][nu]`.
pub type Tensor2 = [[f64; 4]; 4];

/// Connection coefficients `conn[lam][nu][kap] = Γ^lam_{nu kap}`.
pub type Connection = [[[f64; 4]; 4]; 4];

/// Per-zone and per-face geometric data for one patch.
///
/// Index arguments are patch-local `(k, j, i)` over the entire domain,
/// ghost zones included. Implementations must be pure: the same arguments
/// always return the same values.
pub trait Geometry: Send + Sync {
    /// Covariant metric `g_{mu nu}` at `loc` of zone `(k, j, i)`.
    fn gcov(&self, loc: Loci, k: usize, j: usize, i: usize) -> Tensor2;

    /// Contravariant metric `g^{mu nu}` at `loc` of zone `(k, j, i)`.
    fn gcon(&self, loc: Loci, k: usize, j: usize, i: usize) -> Tensor2;

    /// Square root of minus the metric determinant.
    fn gdet(&self, loc: Loci, k: usize, j: usize, i: usize) -> f64;

    /// Connection coefficients at the centre of zone `(k, j, i)`.
    fn conn(&self, k: usize, j: usize, i: usize) -> Connection;

    /// Coordinate zone width along `dir`.
    fn dx(&self, dir: Direction) -> f64;

    /// Lapse `1 / sqrt(-g^{00})` of the normal observer.
    fn lapse(&self, loc: Loci, k: usize, j: usize, i: usize) -> f64 {
        1.0 / (-self.gcon(loc, k, j, i)[0][0]).sqrt()
    }
}

/// Lower a contravariant vector: `v_mu = g_{mu nu} v^nu`.
#[inline]
pub fn lower(v: &Vec4, gcov: &Tensor2) -> Vec4 {
    let mut out = [0.0; 4];
    for (mu, row) in gcov.iter().enumerate() {
        out[mu] = row.iter().zip(v.iter()).map(|(g, x)| g * x).sum();
    }
    out
}

/// Contract two vectors of opposite variance: `a^mu b_mu`.
#[inline]
pub fn dot(a: &Vec4, b: &Vec4) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Flat spacetime in Cartesian coordinates, signature `(-, +, +, +)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Minkowski {
    dx: [f64; 3],
}

const ETA: Tensor2 = [
    [-1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

impl Minkowski {
    /// Flat geometry with per-direction zone widths `(dx1, dx2, dx3)`.
    pub fn new(dx: [f64; 3]) -> Self {
        Self { dx }
    }

    /// Flat geometry with the same zone width in every direction.
    pub fn uniform(dx: f64) -> Self {
        Self { dx: [dx; 3] }
    }
}

impl Geometry for Minkowski {
    fn gcov(&self, _loc: Loci, _k: usize, _j: usize, _i: usize) -> Tensor2 {
        ETA
    }

    fn gcon(&self, _loc: Loci, _k: usize, _j: usize, _i: usize) -> Tensor2 {
        ETA
    }

    fn gdet(&self, _loc: Loci, _k: usize, _j: usize, _i: usize) -> f64 {
        1.0
    }

    fn conn(&self, _k: usize, _j: usize, _i: usize) -> Connection {
        [[[0.0; 4]; 4]; 4]
    }

    fn dx(&self, dir: Direction) -> f64 {
        self.dx[dir.index()]
    }

    fn lapse(&self, _loc: Loci, _k: usize, _j: usize, _i: usize) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn minkowski_metric_is_its_own_inverse() {
        let g = Minkowski::uniform(0.1);
        let gcov = g.gcov(Loci::Center, 0, 0, 0);
        let gcon = g.gcon(Loci::Center, 0, 0, 0);
        for mu in 0..4 {
            for nu in 0..4 {
                let prod: f64 = (0..4).map(|l| gcov[mu][l] * gcon[l][nu]).sum();
                let expected = if mu == nu { 1.0 } else { 0.0 };
                assert_eq!(prod, expected);
            }
        }
    }

    #[test]
    fn lower_flips_time_component() {
        let v = [2.0, 1.0, -1.0, 0.5];
        let low = lower(&v, &ETA);
        assert_eq!(low, [-2.0, 1.0, -1.0, 0.5]);
        assert_eq!(dot(&v, &low), -4.0 + 1.0 + 1.0 + 0.25);
    }

    #[test]
    fn default_lapse_matches_flat_override() {
        struct Plain;
        impl Geometry for Plain {
            fn gcov(&self, _: Loci, _: usize, _: usize, _: usize) -> Tensor2 {
                ETA
            }
            fn gcon(&self, _: Loci, _: usize, _: usize, _: usize) -> Tensor2 {
                ETA
            }
            fn gdet(&self, _: Loci, _: usize, _: usize, _: usize) -> f64 {
                1.0
            }
            fn conn(&self, _: usize, _: usize, _: usize) -> Connection {
                [[[0.0; 4]; 4]; 4]
            }
            fn dx(&self, _: Direction) -> f64 {
                1.0
            }
        }
        assert_eq!(Plain.lapse(Loci::Center, 0, 0, 0), 1.0);
    }

    #[test]
    fn per_direction_widths() {
        let g = Minkowski::new([0.1, 0.2, 0.4]);
        assert_eq!(g.dx(Direction::X1), 0.1);
        assert_eq!(g.dx(Direction::X3), 0.4);
    }

    proptest! {
        #[test]
        fn flat_norm_has_lorentzian_signature(v in prop::array::uniform4(-10.0f64..10.0)) {
            let g = Minkowski::uniform(1.0);
            let low = lower(&v, &g.gcov(Loci::Face(Direction::X2), 1, 2, 3));
            let expected = -v[0] * v[0] + v[1] * v[1] + v[2] * v[2] + v[3] * v[3];
            assert_relative_eq!(dot(&v, &low), expected, epsilon = 1e-12);
        }
    }
}
