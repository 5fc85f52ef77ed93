//! Physical and custom boundary conditions on outer patch faces.
//!
//! A face is physical when the layout has no neighbour across it. Physical
//! appliers run direction by direction over the full transverse extent of
//! the patch, so edge and corner ghosts are filled from ghosts set by the
//! earlier directions.

use grmhd_core::Direction;
use grmhd_mesh::{CellBounds, Container, IndexBox, IndexDomain, IndexRange};

/// One of the six outer faces of a patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundaryFace {
    /// Face normal.
    pub dir: Direction,
    /// High side if `true`.
    pub high: bool,
}

impl BoundaryFace {
    /// The six faces, X1 low first.
    pub fn all() -> impl Iterator<Item = BoundaryFace> {
        Direction::ALL
            .into_iter()
            .flat_map(|dir| [false, true].map(|high| BoundaryFace { dir, high }))
    }

    /// Ghost zones beyond this face, spanning the entire transverse range.
    pub fn ghost_box(&self, bounds: &CellBounds) -> IndexBox {
        let r = bounds.range(IndexDomain::Interior, self.dir);
        let ng = bounds.ng();
        let ghosts = if self.high {
            IndexRange::new(r.e + 1, r.e + ng)
        } else {
            IndexRange::new(r.s - ng, r.s - 1)
        };
        bounds.entire().with_range(self.dir, ghosts)
    }

    /// Index of the last interior zone along the normal on this side.
    fn edge_zone(&self, bounds: &CellBounds) -> usize {
        let r = bounds.range(IndexDomain::Interior, self.dir);
        if self.high {
            r.e
        } else {
            r.s
        }
    }
}

/// Fills ghost zones on a face with no neighbouring patch.
pub trait PhysicalBoundary: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Fill the primitive and conserved ghosts beyond `face`.
    fn apply(&self, c: &mut Container, face: BoundaryFace);
}

/// Zero-gradient boundary: every ghost copies the nearest interior zone
/// along the face normal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outflow;

impl PhysicalBoundary for Outflow {
    fn name(&self) -> &str {
        "outflow"
    }

    fn apply(&self, c: &mut Container, face: BoundaryFace) {
        let bounds = *c.bounds();
        let edge = face.edge_zone(&bounds);
        let src = |k: usize, j: usize, i: usize| match face.dir {
            Direction::X1 => (k, j, edge),
            Direction::X2 => (k, edge, i),
            Direction::X3 => (edge, j, i),
        };
        for (k, j, i) in face.ghost_box(&bounds).iter() {
            let (ks, js, is) = src(k, j, i);
            let p = c.prims.state(ks, js, is);
            let u = c.cons.state(ks, js, is);
            c.prims.set_state(k, j, i, &p);
            c.cons.set_state(k, j, i, &u);
        }
    }
}

/// Problem-specific boundary hook, run after the physical appliers on the
/// same faces.
pub trait CustomBoundary: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Adjust ghost zones beyond `faces`. Called once per stage, also when
    /// `faces` is empty.
    fn apply(&self, c: &mut Container, faces: &[BoundaryFace]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use grmhd_core::{StateVector, Var};

    #[test]
    fn six_faces() {
        let faces: Vec<_> = BoundaryFace::all().collect();
        assert_eq!(faces.len(), 6);
        assert_eq!(
            faces[3],
            BoundaryFace {
                dir: Direction::X2,
                high: true
            }
        );
    }

    #[test]
    fn ghost_box_spans_transverse_halo() {
        let b = CellBounds::new([4, 3, 2], 2).unwrap();
        let g = BoundaryFace {
            dir: Direction::X2,
            high: false,
        }
        .ghost_box(&b);
        assert_eq!(g.j, IndexRange::new(0, 1));
        assert_eq!(g.i, b.entire().i);
        assert_eq!(g.k, b.entire().k);
    }

    #[test]
    fn outflow_copies_edge_zone() {
        let b = CellBounds::new([3, 2, 2], 2).unwrap();
        let mut c = Container::new("base", b);
        for (k, j, i) in b.interior().iter() {
            let s = StateVector::primitive(i as f64, 1.0, [0.0; 3], [0.0; 3]);
            c.prims.set_state(k, j, i, &s);
            c.cons.set_state(k, j, i, &s);
        }
        for face in BoundaryFace::all() {
            Outflow.apply(&mut c, face);
        }
        // interior i runs 2..=4
        for (k, j, i) in b.entire().iter() {
            let expect = i.clamp(2, 4) as f64;
            assert_eq!(c.prims.var(Var::Rho, k, j, i), expect);
            assert_eq!(c.cons.var(Var::Rho, k, j, i), expect);
        }
    }
}
