//! Index ranges and patch cell bounds.
//!
//! All ranges are inclusive on both ends, matching the `is..=ie` loops the
//! kernels are written against. Patches are always three-dimensional and
//! carry the same number of ghost zones on every side.

use grmhd_core::Direction;

use crate::error::MeshError;

/// Smallest halo the flux stencil supports.
///
/// Fluxes are computed one layer beyond the interior and the left state of
/// a face is read one further zone back, so two ghost zones are required.
pub const MIN_GHOST_ZONES: usize = 2;

/// An inclusive index range `s..=e`. Never empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexRange {
    /// First index.
    pub s: usize,
    /// Last index (inclusive).
    pub e: usize,
}

impl IndexRange {
    /// Range from `s` to `e` inclusive. Callers guarantee `s <= e`.
    pub const fn new(s: usize, e: usize) -> Self {
        Self { s, e }
    }

    /// Number of indices covered.
    pub const fn len(&self) -> usize {
        self.e + 1 - self.s
    }

    /// Always `false`; a range covers at least one index.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `x` lies in the range.
    pub const fn contains(&self, x: usize) -> bool {
        x >= self.s && x <= self.e
    }

    /// Widen by `lo` below and `hi` above. Callers guarantee `lo <= s`.
    pub const fn widen(&self, lo: usize, hi: usize) -> Self {
        Self {
            s: self.s - lo,
            e: self.e + hi,
        }
    }

    /// Iterate the covered indices in order.
    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.s..=self.e
    }
}

/// Which part of a patch a range refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexDomain {
    /// Physically meaningful zones.
    Interior,
    /// Interior plus halo.
    Entire,
}

/// A box of zones, one inclusive range per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    /// Range along `k` (X3).
    pub k: IndexRange,
    /// Range along `j` (X2).
    pub j: IndexRange,
    /// Range along `i` (X1).
    pub i: IndexRange,
}

impl IndexBox {
    /// Box from its three ranges.
    pub const fn new(k: IndexRange, j: IndexRange, i: IndexRange) -> Self {
        Self { k, j, i }
    }

    /// Range along `dir`.
    pub const fn range(&self, dir: Direction) -> IndexRange {
        match dir {
            Direction::X1 => self.i,
            Direction::X2 => self.j,
            Direction::X3 => self.k,
        }
    }

    /// Replace the range along `dir`.
    pub fn with_range(mut self, dir: Direction, r: IndexRange) -> Self {
        match dir {
            Direction::X1 => self.i = r,
            Direction::X2 => self.j = r,
            Direction::X3 => self.k = r,
        }
        self
    }

    /// Grow by `n` zones on every side of every axis.
    pub const fn grow(&self, n: usize) -> Self {
        Self {
            k: self.k.widen(n, n),
            j: self.j.widen(n, n),
            i: self.i.widen(n, n),
        }
    }

    /// Extend by one zone on the high side of `dir` only.
    ///
    /// Turns a range of zones into the range of their faces normal to `dir`.
    pub fn faces(&self, dir: Direction) -> Self {
        let r = self.range(dir);
        self.with_range(dir, r.widen(0, 1))
    }

    /// Number of zones in the box.
    pub const fn len(&self) -> usize {
        self.k.len() * self.j.len() * self.i.len()
    }

    /// Always `false`; every axis covers at least one index.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `(k, j, i)` lies in the box.
    pub const fn contains(&self, k: usize, j: usize, i: usize) -> bool {
        self.k.contains(k) && self.j.contains(j) && self.i.contains(i)
    }

    /// Iterate `(k, j, i)` with `i` fastest.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (jr, ir) = (self.j, self.i);
        self.k
            .iter()
            .flat_map(move |k| jr.iter().flat_map(move |j| ir.iter().map(move |i| (k, j, i))))
    }

    /// Collect the box's zones in iteration order.
    ///
    /// Kernels collect once and hand the list to a parallel iterator.
    pub fn zones(&self) -> Vec<(usize, usize, usize)> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.iter());
        out
    }
}

/// Interior size and halo depth of one patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellBounds {
    nx: [usize; 3],
    ng: usize,
}

impl CellBounds {
    /// Bounds for a patch with `nx = [n1, n2, n3]` interior zones and `ng`
    /// ghost zones on every side.
    ///
    /// # Errors
    ///
    /// [`MeshError::TooFewGhostZones`] if `ng < MIN_GHOST_ZONES`, and
    /// [`MeshError::TooFewCells`] if any direction has fewer than `ng`
    /// interior zones (a ghost slab must fit inside a neighbour's interior).
    pub fn new(nx: [usize; 3], ng: usize) -> Result<Self, MeshError> {
        if ng < MIN_GHOST_ZONES {
            return Err(MeshError::TooFewGhostZones {
                ng,
                min: MIN_GHOST_ZONES,
            });
        }
        for dir in Direction::ALL {
            let cells = nx[dir.index()];
            if cells < ng {
                return Err(MeshError::TooFewCells {
                    dir,
                    cells,
                    min: ng,
                });
            }
        }
        Ok(Self { nx, ng })
    }

    /// Ghost zones per side.
    pub const fn ng(&self) -> usize {
        self.ng
    }

    /// Interior zones along `dir`.
    pub const fn nx(&self, dir: Direction) -> usize {
        self.nx[dir.index()]
    }

    /// Zones along `dir` including both halos.
    pub const fn ncells(&self, dir: Direction) -> usize {
        self.nx[dir.index()] + 2 * self.ng
    }

    /// Entire-domain shape as `(nk, nj, ni)`.
    pub const fn shape(&self) -> (usize, usize, usize) {
        (
            self.ncells(Direction::X3),
            self.ncells(Direction::X2),
            self.ncells(Direction::X1),
        )
    }

    /// Range along `dir` for `domain`.
    pub const fn range(&self, domain: IndexDomain, dir: Direction) -> IndexRange {
        match domain {
            IndexDomain::Interior => {
                IndexRange::new(self.ng, self.ng + self.nx[dir.index()] - 1)
            }
            IndexDomain::Entire => IndexRange::new(0, self.ncells(dir) - 1),
        }
    }

    /// Box covering `domain`.
    pub const fn domain(&self, domain: IndexDomain) -> IndexBox {
        IndexBox::new(
            self.range(domain, Direction::X3),
            self.range(domain, Direction::X2),
            self.range(domain, Direction::X1),
        )
    }

    /// Interior box.
    pub const fn interior(&self) -> IndexBox {
        self.domain(IndexDomain::Interior)
    }

    /// Entire box, halo included.
    pub const fn entire(&self) -> IndexBox {
        self.domain(IndexDomain::Entire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_and_entire_ranges() {
        let b = CellBounds::new([8, 4, 2], 2).unwrap();
        assert_eq!(b.range(IndexDomain::Interior, Direction::X1), IndexRange::new(2, 9));
        assert_eq!(b.range(IndexDomain::Entire, Direction::X1), IndexRange::new(0, 11));
        assert_eq!(b.range(IndexDomain::Interior, Direction::X3), IndexRange::new(2, 3));
        assert_eq!(b.shape(), (6, 8, 12));
        assert_eq!(b.interior().len(), 64);
    }

    #[test]
    fn thin_halo_rejected() {
        assert_eq!(
            CellBounds::new([4, 4, 4], 1),
            Err(MeshError::TooFewGhostZones { ng: 1, min: 2 })
        );
    }

    #[test]
    fn interior_thinner_than_halo_rejected() {
        let err = CellBounds::new([4, 1, 4], 2).unwrap_err();
        assert_eq!(
            err,
            MeshError::TooFewCells {
                dir: Direction::X2,
                cells: 1,
                min: 2
            }
        );
    }

    #[test]
    fn box_iteration_is_i_fastest() {
        let b = IndexBox::new(
            IndexRange::new(0, 1),
            IndexRange::new(3, 3),
            IndexRange::new(5, 6),
        );
        let zones = b.zones();
        assert_eq!(zones, vec![(0, 3, 5), (0, 3, 6), (1, 3, 5), (1, 3, 6)]);
        assert_eq!(zones.len(), b.len());
    }

    #[test]
    fn grow_and_faces() {
        let b = CellBounds::new([4, 4, 4], 2).unwrap();
        let g = b.interior().grow(1);
        assert_eq!(g.i, IndexRange::new(1, 6));
        let f = b.interior().faces(Direction::X2);
        assert_eq!(f.j, IndexRange::new(2, 6));
        assert_eq!(f.i, IndexRange::new(2, 5));
        assert!(f.contains(2, 6, 5));
        assert!(!f.contains(2, 6, 6));
    }
}
