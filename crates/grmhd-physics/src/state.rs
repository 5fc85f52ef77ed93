//! Wave-speed and flux kernel.
//!
//! Pure per-zone functions of a primitive state and the local metric. The
//! same [`FourVectors`] derivation feeds the conserved vector, the
//! directional fluxes and the magnetosonic speeds, so callers build it once
//! per state and reuse it.
//!
//! Nothing here validates its input. An unphysical state produces NaN or
//! infinities that flow through to the caller.

use grmhd_core::{
    dot, lower, Direction, FluxSelector, Geometry, Loci, StateVector, Tensor2, Var, Vec4,
};

use crate::eos::EquationOfState;

/// Floor on the squared fast magnetosonic speed.
const CMS2_FLOOR: f64 = 1e-20;

/// Maximum of two values that returns NaN if either is NaN.
#[inline]
pub(crate) fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Minimum of two values that returns NaN if either is NaN.
#[inline]
pub(crate) fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// Metric data at one locus of one zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalMetric {
    /// Covariant metric.
    pub gcov: Tensor2,
    /// Contravariant metric.
    pub gcon: Tensor2,
    /// `sqrt(-g)`.
    pub gdet: f64,
    /// Lapse of the normal observer.
    pub alpha: f64,
}

impl LocalMetric {
    /// Sample `geom` at `loc` of zone `(k, j, i)`.
    pub fn at(geom: &dyn Geometry, loc: Loci, k: usize, j: usize, i: usize) -> Self {
        Self {
            gcov: geom.gcov(loc, k, j, i),
            gcon: geom.gcon(loc, k, j, i),
            gdet: geom.gdet(loc, k, j, i),
            alpha: geom.lapse(loc, k, j, i),
        }
    }
}

/// Fluid four-velocity and magnetic four-vector, both variances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FourVectors {
    /// `u^mu`.
    pub ucon: Vec4,
    /// `u_mu`.
    pub ucov: Vec4,
    /// `b^mu`.
    pub bcon: Vec4,
    /// `b_mu`.
    pub bcov: Vec4,
}

impl FourVectors {
    /// `b^mu b_mu`.
    #[inline]
    pub fn bsq(&self) -> f64 {
        dot(&self.bcon, &self.bcov)
    }
}

/// Build the four-vectors of primitive state `p`.
///
/// The primitive velocity is the spatial four-velocity relative to the
/// normal observer; the primitive field is the lab-frame `B^i`.
pub fn get_state(p: &StateVector, m: &LocalMetric) -> FourVectors {
    let ut = p.velocity();
    let mut qsq = 0.0;
    for (a, ua) in ut.iter().enumerate() {
        for (b, ub) in ut.iter().enumerate() {
            qsq += m.gcov[a + 1][b + 1] * ua * ub;
        }
    }
    let gamma = (1.0 + qsq).sqrt();

    let mut ucon = [gamma / m.alpha, 0.0, 0.0, 0.0];
    for a in 0..3 {
        ucon[a + 1] = ut[a] - gamma * m.alpha * m.gcon[0][a + 1];
    }
    let ucov = lower(&ucon, &m.gcov);

    let field = p.field();
    let b0 = field[0] * ucov[1] + field[1] * ucov[2] + field[2] * ucov[3];
    let mut bcon = [b0, 0.0, 0.0, 0.0];
    for a in 0..3 {
        bcon[a + 1] = (field[a] + b0 * ucon[a + 1]) / ucon[0];
    }
    let bcov = lower(&bcon, &m.gcov);

    FourVectors {
        ucon,
        ucov,
        bcon,
        bcov,
    }
}

/// Row `mu` of the mixed stress-energy tensor, `T^mu_nu` for `nu = 0..4`.
pub fn stress_row(p: &StateVector, d: &FourVectors, eos: &dyn EquationOfState, mu: usize) -> Vec4 {
    let rho = p[Var::Rho];
    let u = p[Var::Uu];
    let pgas = eos.pressure(rho, u);
    let bsq = d.bsq();
    let eta = pgas + rho + u + bsq;
    let ptot = pgas + 0.5 * bsq;

    let mut t = [0.0; 4];
    for (nu, tn) in t.iter_mut().enumerate() {
        let delta = if mu == nu { 1.0 } else { 0.0 };
        *tn = eta * d.ucon[mu] * d.ucov[nu] + ptot * delta - d.bcon[mu] * d.bcov[nu];
    }
    t
}

/// Conserved vector (`FluxSelector::Conserved`) or physical flux in a
/// direction, densitized by `sqrt(-g)`.
///
/// The energy slot carries `T^mu_0 + rho u^mu` so that rest-mass energy
/// is subtracted from the evolved energy density.
pub fn prim_to_flux(
    p: &StateVector,
    d: &FourVectors,
    eos: &dyn EquationOfState,
    m: &LocalMetric,
    sel: FluxSelector,
) -> StateVector {
    let mu = sel.mu();
    let mass = p[Var::Rho] * d.ucon[mu];
    let t = stress_row(p, d, eos, mu);

    let mut f = StateVector::zeros();
    f[Var::Rho] = mass;
    f[Var::Uu] = t[0] + mass;
    for dir in Direction::ALL {
        let a = dir.number();
        f[Var::velocity(dir)] = t[a];
        f[Var::field(dir)] = d.bcon[a] * d.ucon[mu] - d.bcon[mu] * d.ucon[a];
    }
    f * m.gdet
}

/// Extremal characteristic speeds along a direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSpeeds {
    /// Fastest signal speed (most positive).
    pub cmax: f64,
    /// Slowest signal speed (most negative).
    pub cmin: f64,
}

/// Fast magnetosonic speeds of state `p` along `dir`.
///
/// Solves the dispersion relation for the fast mode in the frame of the
/// coordinate basis, using the combined sound and Alfvén speed
/// `cms2 = cs2 + va2 - cs2 * va2`.
pub fn mhd_vchar(
    p: &StateVector,
    d: &FourVectors,
    eos: &dyn EquationOfState,
    m: &LocalMetric,
    dir: Direction,
) -> WaveSpeeds {
    let rho = p[Var::Rho];
    let u = p[Var::Uu];
    let a = dir.number();

    let ef = rho + u + eos.pressure(rho, u);
    let bsq = d.bsq();
    let ee = bsq + ef;
    let va2 = bsq / ee;
    let cs2 = eos.sound_speed_sq(rho, u);

    let mut cms2 = cs2 + va2 - cs2 * va2;
    if cms2 < 0.0 {
        cms2 = CMS2_FLOOR;
    }
    if cms2 > 1.0 {
        cms2 = 1.0;
    }

    // A_mu = delta_mu^a, B_mu = delta_mu^0.
    let au = d.ucon[a];
    let bu = d.ucon[0];
    let ab = m.gcon[0][a];
    let asq = m.gcon[a][a];
    let bsq_t = m.gcon[0][0];
    let (au2, bu2, aubu) = (au * au, bu * bu, au * bu);

    let qa = bu2 - (bsq_t + bu2) * cms2;
    let qb = 2.0 * (aubu - (ab + aubu) * cms2);
    let qc = au2 - (asq + au2) * cms2;

    let disc = qb * qb - 4.0 * qa * qc;
    let discr = if disc < 0.0 { 0.0 } else { disc.sqrt() };

    let vp = -(-qb + discr) / (2.0 * qa);
    let vm = -(-qb - discr) / (2.0 * qa);

    WaveSpeeds {
        cmax: nan_max(vp, vm),
        cmin: nan_min(vp, vm),
    }
}

/// Everything the Riemann assembler needs from one side of a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceSample {
    /// Conserved vector.
    pub cons: StateVector,
    /// Physical flux normal to the face.
    pub flux: StateVector,
    /// Characteristic speeds normal to the face.
    pub speeds: WaveSpeeds,
}

/// Conserved vector, flux and speeds of `p` for a face normal to `dir`,
/// all from a single four-vector derivation.
pub fn mhd_calc(
    p: &StateVector,
    eos: &dyn EquationOfState,
    m: &LocalMetric,
    dir: Direction,
) -> FaceSample {
    let d = get_state(p, m);
    FaceSample {
        cons: prim_to_flux(p, &d, eos, m, FluxSelector::Conserved),
        flux: prim_to_flux(p, &d, eos, m, FluxSelector::Flux(dir)),
        speeds: mhd_vchar(p, &d, eos, m, dir),
    }
}
