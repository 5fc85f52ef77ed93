//! Uniform block decomposition of the domain into patches.
//!
//! Patches are numbered X1-fastest. Each patch sees up to 26 neighbours
//! (6 faces, 12 edges, 8 corners); along a periodic direction the
//! neighbour lookup wraps, so a single periodic patch is its own neighbour.

use grmhd_core::{Direction, PatchId};
use smallvec::SmallVec;

use crate::error::MeshError;
use crate::index::{CellBounds, IndexBox, IndexDomain, IndexRange};

/// Position of a neighbour relative to a patch, one of `-1, 0, 1` per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NeighborOffset {
    /// Step along X3.
    pub dk: i8,
    /// Step along X2.
    pub dj: i8,
    /// Step along X1.
    pub di: i8,
}

impl NeighborOffset {
    /// Offset from its three steps.
    pub const fn new(dk: i8, dj: i8, di: i8) -> Self {
        Self { dk, dj, di }
    }

    /// The face neighbour along `dir`, on the high side if `high`.
    pub const fn face(dir: Direction, high: bool) -> Self {
        let s = if high { 1 } else { -1 };
        match dir {
            Direction::X1 => Self::new(0, 0, s),
            Direction::X2 => Self::new(0, s, 0),
            Direction::X3 => Self::new(s, 0, 0),
        }
    }

    /// All 26 non-zero offsets, X1 fastest.
    pub fn all() -> impl Iterator<Item = NeighborOffset> {
        (-1i8..=1).flat_map(|dk| {
            (-1i8..=1).flat_map(move |dj| {
                (-1i8..=1)
                    .map(move |di| NeighborOffset::new(dk, dj, di))
                    .filter(|o| !o.is_zero())
            })
        })
    }

    /// Step along `dir`.
    pub const fn along(&self, dir: Direction) -> i8 {
        match dir {
            Direction::X1 => self.di,
            Direction::X2 => self.dj,
            Direction::X3 => self.dk,
        }
    }

    /// Whether this is the null offset.
    pub const fn is_zero(&self) -> bool {
        self.dk == 0 && self.dj == 0 && self.di == 0
    }

    /// The offset pointing back from the neighbour.
    pub const fn reverse(&self) -> Self {
        Self::new(-self.dk, -self.dj, -self.di)
    }

    /// Interior zones sent to the neighbour at this offset during a ghost
    /// exchange.
    pub fn send_box(&self, bounds: &CellBounds) -> IndexBox {
        self.map_axes(bounds, |r, ng, step| match step {
            1 => IndexRange::new(r.e + 1 - ng, r.e),
            -1 => IndexRange::new(r.s, r.s + ng - 1),
            _ => r,
        })
    }

    /// Ghost zones filled from the neighbour at this offset. Same shape
    /// and zone order as the neighbour's [`NeighborOffset::send_box`] for
    /// the reversed offset.
    pub fn ghost_box(&self, bounds: &CellBounds) -> IndexBox {
        self.map_axes(bounds, |r, ng, step| match step {
            1 => IndexRange::new(r.e + 1, r.e + ng),
            -1 => IndexRange::new(r.s - ng, r.s - 1),
            _ => r,
        })
    }

    fn map_axes(
        &self,
        bounds: &CellBounds,
        f: impl Fn(IndexRange, usize, i8) -> IndexRange,
    ) -> IndexBox {
        let ng = bounds.ng();
        let axis = |dir| f(bounds.range(IndexDomain::Interior, dir), ng, self.along(dir));
        IndexBox::new(axis(Direction::X3), axis(Direction::X2), axis(Direction::X1))
    }
}

/// Interior faces normal to `dir` on the low (`high == false`) or high
/// boundary of a patch.
///
/// The high boundary face of zone `ie` lives at face index `ie + 1`.
pub fn boundary_faces(bounds: &CellBounds, dir: Direction, high: bool) -> IndexBox {
    let r = bounds.range(IndexDomain::Interior, dir);
    let at = if high { r.e + 1 } else { r.s };
    bounds.interior().with_range(dir, IndexRange::new(at, at))
}

/// A neighbouring patch and where it sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    /// Offset from the owning patch to the neighbour.
    pub offset: NeighborOffset,
    /// The neighbour.
    pub patch: PatchId,
}

/// A regular grid of equally sized patches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshLayout {
    npatch: [usize; 3],
    periodic: [bool; 3],
    bounds: CellBounds,
}

impl MeshLayout {
    /// Layout with `npatch = [n1, n2, n3]` patches, each of shape `bounds`.
    ///
    /// # Errors
    ///
    /// [`MeshError::EmptyLayout`] if any direction has zero patches.
    pub fn new(npatch: [usize; 3], periodic: [bool; 3], bounds: CellBounds) -> Result<Self, MeshError> {
        for dir in Direction::ALL {
            if npatch[dir.index()] == 0 {
                return Err(MeshError::EmptyLayout { dir });
            }
        }
        Ok(Self {
            npatch,
            periodic,
            bounds,
        })
    }

    /// One patch, periodic in every direction.
    pub fn single_periodic(bounds: CellBounds) -> Self {
        Self {
            npatch: [1; 3],
            periodic: [true; 3],
            bounds,
        }
    }

    /// Shape shared by every patch.
    pub fn bounds(&self) -> &CellBounds {
        &self.bounds
    }

    /// Whether `dir` wraps around.
    pub fn is_periodic(&self, dir: Direction) -> bool {
        self.periodic[dir.index()]
    }

    /// Patches along `dir`.
    pub fn npatch(&self, dir: Direction) -> usize {
        self.npatch[dir.index()]
    }

    /// Total number of patches.
    pub fn num_patches(&self) -> usize {
        self.npatch.iter().product()
    }

    /// Every patch id in order.
    pub fn patches(&self) -> impl Iterator<Item = PatchId> {
        (0..self.num_patches() as u32).map(PatchId)
    }

    /// Block position `[p1, p2, p3]` of `id`.
    pub fn position(&self, id: PatchId) -> [usize; 3] {
        let n = id.0 as usize;
        let [n1, n2, _] = self.npatch;
        [n % n1, (n / n1) % n2, n / (n1 * n2)]
    }

    fn id_at(&self, pos: [usize; 3]) -> PatchId {
        let [n1, n2, _] = self.npatch;
        PatchId((pos[0] + n1 * (pos[1] + n2 * pos[2])) as u32)
    }

    /// The patch at `offset` from `id`, if any.
    pub fn neighbor(&self, id: PatchId, offset: NeighborOffset) -> Option<PatchId> {
        let pos = self.position(id);
        let mut out = [0usize; 3];
        for dir in Direction::ALL {
            let d = dir.index();
            let n = self.npatch[d] as i64;
            let p = pos[d] as i64 + i64::from(offset.along(dir));
            out[d] = if (0..n).contains(&p) {
                p as usize
            } else if self.periodic[d] {
                p.rem_euclid(n) as usize
            } else {
                return None;
            };
        }
        Some(self.id_at(out))
    }

    /// All neighbours of `id`, X1-fastest offset order.
    pub fn neighbors(&self, id: PatchId) -> SmallVec<[Neighbor; 26]> {
        NeighborOffset::all()
            .filter_map(|offset| {
                self.neighbor(id, offset)
                    .map(|patch| Neighbor { offset, patch })
            })
            .collect()
    }
}
