//! Logical directions, their unit index offsets, and flux selectors.
//!
//! The left/right sampling shift used by the flux assembler and the
//! neighbour reads of the CT corrector both come from
//! [`Direction::offset`]; no kernel branches on direction to pick an index.

use std::fmt;

use crate::error::ParameterError;

/// One of the three logical grid directions.
///
/// X1 runs along the `i` index, X2 along `j`, X3 along `k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// The `i` direction.
    X1,
    /// The `j` direction.
    X2,
    /// The `k` direction.
    X3,
}

/// A unit step along one index axis, in `(k, j, i)` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Step along `k`.
    pub k: usize,
    /// Step along `j`.
    pub j: usize,
    /// Step along `i`.
    pub i: usize,
}

impl Offset {
    /// The zone one step behind `(k, j, i)`.
    ///
    /// Callers guarantee the index along the offset axis is at least one.
    #[inline]
    pub const fn behind(self, k: usize, j: usize, i: usize) -> (usize, usize, usize) {
        (k - self.k, j - self.j, i - self.i)
    }

    /// The zone one step ahead of `(k, j, i)`.
    #[inline]
    pub const fn ahead(self, k: usize, j: usize, i: usize) -> (usize, usize, usize) {
        (k + self.k, j + self.j, i + self.i)
    }
}

impl Direction {
    /// All directions in X1, X2, X3 order.
    pub const ALL: [Direction; 3] = [Direction::X1, Direction::X2, Direction::X3];

    /// Zero-based slot (0, 1, 2), used to index per-direction arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::X1 => 0,
            Direction::X2 => 1,
            Direction::X3 => 2,
        }
    }

    /// One-based direction number (1, 2, 3), also the contravariant
    /// spacetime index of this direction.
    #[inline]
    pub const fn number(self) -> usize {
        self.index() + 1
    }

    /// Direction from its one-based number.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnsupportedDirection`] for anything but 1, 2, 3.
    pub fn from_number(n: usize) -> Result<Self, ParameterError> {
        match n {
            1 => Ok(Direction::X1),
            2 => Ok(Direction::X2),
            3 => Ok(Direction::X3),
            other => Err(ParameterError::UnsupportedDirection { selector: other }),
        }
    }

    /// Unit index offset along this direction.
    #[inline]
    pub const fn offset(self) -> Offset {
        match self {
            Direction::X1 => Offset { k: 0, j: 0, i: 1 },
            Direction::X2 => Offset { k: 0, j: 1, i: 0 },
            Direction::X3 => Offset { k: 1, j: 0, i: 0 },
        }
    }

    /// The two directions transverse to this one, in cyclic order.
    ///
    /// `X1 -> (X2, X3)`, `X2 -> (X3, X1)`, `X3 -> (X1, X2)`.
    #[inline]
    pub const fn transverse(self) -> (Direction, Direction) {
        match self {
            Direction::X1 => (Direction::X2, Direction::X3),
            Direction::X2 => (Direction::X3, Direction::X1),
            Direction::X3 => (Direction::X1, Direction::X2),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.number())
    }
}

/// What the flux kernel should produce for a state.
///
/// Selector 0 asks for the conserved vector, selectors 1 to 3 ask for the
/// physical flux through a face normal to that direction. Both reuse the
/// same state derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FluxSelector {
    /// The conserved-variable vector (time component of the flux).
    Conserved,
    /// The physical flux along a direction.
    Flux(Direction),
}

impl FluxSelector {
    /// Selector from its integer code (0 = conserved, 1..=3 = direction).
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnsupportedDirection`] for codes above 3.
    pub fn from_index(selector: usize) -> Result<Self, ParameterError> {
        match selector {
            0 => Ok(FluxSelector::Conserved),
            n => Direction::from_number(n).map(FluxSelector::Flux),
        }
    }

    /// Contravariant spacetime index of the flux component (0..=3).
    #[inline]
    pub const fn mu(self) -> usize {
        match self {
            FluxSelector::Conserved => 0,
            FluxSelector::Flux(dir) => dir.number(),
        }
    }
}

/// Where on a zone a geometric quantity is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Loci {
    /// Zone centre.
    Center,
    /// Centre of the low-side face normal to a direction.
    Face(Direction),
    /// Low corner of the zone.
    Corner,
}

impl Loci {
    /// The face locus a flux in `dir` lives on.
    #[inline]
    pub const fn face(dir: Direction) -> Loci {
        Loci::Face(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_unit_along_their_axis() {
        assert_eq!(Direction::X1.offset(), Offset { k: 0, j: 0, i: 1 });
        assert_eq!(Direction::X2.offset(), Offset { k: 0, j: 1, i: 0 });
        assert_eq!(Direction::X3.offset(), Offset { k: 1, j: 0, i: 0 });
    }

    #[test]
    fn behind_and_ahead_are_inverse() {
        for dir in Direction::ALL {
            let off = dir.offset();
            let (k, j, i) = off.behind(3, 4, 5);
            assert_eq!(off.ahead(k, j, i), (3, 4, 5));
        }
    }

    #[test]
    fn selector_codes() {
        assert_eq!(FluxSelector::from_index(0).unwrap(), FluxSelector::Conserved);
        assert_eq!(
            FluxSelector::from_index(2).unwrap(),
            FluxSelector::Flux(Direction::X2)
        );
        assert_eq!(FluxSelector::from_index(3).unwrap().mu(), 3);
    }

    #[test]
    fn unsupported_selector_rejected() {
        let err = FluxSelector::from_index(4).unwrap_err();
        assert_eq!(err, ParameterError::UnsupportedDirection { selector: 4 });
        assert!(Direction::from_number(0).is_err());
    }

    #[test]
    fn transverse_pairs_are_cyclic() {
        assert_eq!(Direction::X1.transverse(), (Direction::X2, Direction::X3));
        assert_eq!(Direction::X2.transverse(), (Direction::X3, Direction::X1));
        assert_eq!(Direction::X3.transverse(), (Direction::X1, Direction::X2));
    }
}
