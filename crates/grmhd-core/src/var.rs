//! The eight evolved quantities and the typed [`StateVector`] record.
//!
//! Primitive and conserved vectors share one enumeration: slot `Var::Rho`
//! holds the rest-mass density in a primitive vector and the rest-mass
//! flux density in a conserved or flux vector. Indexing by [`Var`] instead
//! of a raw integer keeps component mix-ups out of the kernels.

use std::ops::{Add, Index, IndexMut, Mul, Sub};

use crate::direction::Direction;

/// Number of evolved variables per zone.
pub const NPRIM: usize = 8;

/// One of the eight evolved quantities.
///
/// The discriminant is the storage slot in every grid array component
/// axis, so `Var::B2 as usize == 6` everywhere in the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Var {
    /// Rest-mass density.
    Rho = 0,
    /// Internal energy density.
    Uu = 1,
    /// Velocity component along X1 (normal-observer frame).
    U1 = 2,
    /// Velocity component along X2.
    U2 = 3,
    /// Velocity component along X3.
    U3 = 4,
    /// Magnetic field component along X1.
    B1 = 5,
    /// Magnetic field component along X2.
    B2 = 6,
    /// Magnetic field component along X3.
    B3 = 7,
}

impl Var {
    /// All variables in storage order.
    pub const ALL: [Var; NPRIM] = [
        Var::Rho,
        Var::Uu,
        Var::U1,
        Var::U2,
        Var::U3,
        Var::B1,
        Var::B2,
        Var::B3,
    ];

    /// Storage slot of this variable.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Velocity component along `dir`.
    #[inline]
    pub const fn velocity(dir: Direction) -> Var {
        match dir {
            Direction::X1 => Var::U1,
            Direction::X2 => Var::U2,
            Direction::X3 => Var::U3,
        }
    }

    /// Magnetic field component along `dir`.
    #[inline]
    pub const fn field(dir: Direction) -> Var {
        match dir {
            Direction::X1 => Var::B1,
            Direction::X2 => Var::B2,
            Direction::X3 => Var::B3,
        }
    }

    /// Short lowercase name, used in logs and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Var::Rho => "rho",
            Var::Uu => "u",
            Var::U1 => "u1",
            Var::U2 => "u2",
            Var::U3 => "u3",
            Var::B1 => "B1",
            Var::B2 => "B2",
            Var::B3 => "B3",
        }
    }
}

/// A fixed-size vector of the eight evolved quantities at one zone or face.
///
/// Used for primitive states, conserved states and physical fluxes alike.
/// Supports the small amount of vector arithmetic the flux blend needs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateVector([f64; NPRIM]);

impl StateVector {
    /// The zero vector.
    pub const fn zeros() -> Self {
        Self([0.0; NPRIM])
    }

    /// Build from a raw array in storage order.
    pub const fn from_array(values: [f64; NPRIM]) -> Self {
        Self(values)
    }

    /// Build a vector by evaluating `f` for every variable.
    pub fn from_fn(mut f: impl FnMut(Var) -> f64) -> Self {
        let mut out = Self::zeros();
        for v in Var::ALL {
            out[v] = f(v);
        }
        out
    }

    /// Primitive state from its physical parts.
    ///
    /// `vel` and `field` are ordered X1, X2, X3.
    pub const fn primitive(rho: f64, u: f64, vel: [f64; 3], field: [f64; 3]) -> Self {
        Self([
            rho, u, vel[0], vel[1], vel[2], field[0], field[1], field[2],
        ])
    }

    /// The underlying values in storage order.
    pub const fn as_array(&self) -> &[f64; NPRIM] {
        &self.0
    }

    /// Velocity triple (X1, X2, X3).
    pub fn velocity(&self) -> [f64; 3] {
        [self[Var::U1], self[Var::U2], self[Var::U3]]
    }

    /// Magnetic field triple (X1, X2, X3).
    pub fn field(&self) -> [f64; 3] {
        [self[Var::B1], self[Var::B2], self[Var::B3]]
    }

    /// Iterate `(variable, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        Var::ALL.iter().map(move |&v| (v, self[v]))
    }

    /// Largest absolute component, NaN-propagating.
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0_f64, |acc, x| {
            if x.is_nan() || acc.is_nan() {
                f64::NAN
            } else {
                acc.max(x.abs())
            }
        })
    }
}

impl Index<Var> for StateVector {
    type Output = f64;

    #[inline]
    fn index(&self, v: Var) -> &f64 {
        &self.0[v.index()]
    }
}

impl IndexMut<Var> for StateVector {
    #[inline]
    fn index_mut(&mut self, v: Var) -> &mut f64 {
        &mut self.0[v.index()]
    }
}

impl Add for StateVector {
    type Output = StateVector;

    fn add(self, rhs: StateVector) -> StateVector {
        StateVector::from_fn(|v| self[v] + rhs[v])
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, rhs: StateVector) -> StateVector {
        StateVector::from_fn(|v| self[v] - rhs[v])
    }
}

impl Mul<f64> for StateVector {
    type Output = StateVector;

    fn mul(self, rhs: f64) -> StateVector {
        StateVector::from_fn(|v| self[v] * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_order_matches_discriminants() {
        for (slot, v) in Var::ALL.iter().enumerate() {
            assert_eq!(v.index(), slot);
        }
        assert_eq!(Var::B2.index(), 6);
    }

    #[test]
    fn direction_component_lookup() {
        assert_eq!(Var::velocity(Direction::X2), Var::U2);
        assert_eq!(Var::field(Direction::X3), Var::B3);
    }

    #[test]
    fn primitive_constructor_places_components() {
        let p = StateVector::primitive(1.0, 2.0, [0.1, 0.2, 0.3], [4.0, 5.0, 6.0]);
        assert_eq!(p[Var::Rho], 1.0);
        assert_eq!(p[Var::Uu], 2.0);
        assert_eq!(p.velocity(), [0.1, 0.2, 0.3]);
        assert_eq!(p.field(), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn arithmetic_is_componentwise() {
        let a = StateVector::from_fn(|v| v.index() as f64);
        let b = StateVector::from_fn(|_| 1.0);
        let c = (a + b) * 2.0 - b;
        for v in Var::ALL {
            assert_eq!(c[v], 2.0 * (v.index() as f64 + 1.0) - 1.0);
        }
    }

    #[test]
    fn max_abs_propagates_nan() {
        let mut a = StateVector::from_fn(|_| -3.0);
        assert_eq!(a.max_abs(), 3.0);
        a[Var::U3] = f64::NAN;
        assert!(a.max_abs().is_nan());
    }
}
