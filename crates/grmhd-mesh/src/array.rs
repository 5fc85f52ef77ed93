//! Dense multi-component grid storage.

use std::ops::{Index, IndexMut};

use grmhd_core::{StateVector, Var, NPRIM};

use crate::index::{CellBounds, IndexBox};

/// A flat `f64` array indexed by `(component, k, j, i)`, `i` fastest.
///
/// Covers the entire domain of one patch, halo included. Face-centred
/// arrays use the same shape: slot `(k, j, i)` of a direction-`d` face
/// array holds the face on the low side of zone `(k, j, i)` along `d`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridArray {
    ncomp: usize,
    nk: usize,
    nj: usize,
    ni: usize,
    data: Vec<f64>,
}

impl GridArray {
    /// Zero-filled array with `ncomp` components over the entire domain of
    /// `bounds`.
    pub fn zeros(ncomp: usize, bounds: &CellBounds) -> Self {
        let (nk, nj, ni) = bounds.shape();
        Self {
            ncomp,
            nk,
            nj,
            ni,
            data: vec![0.0; ncomp * nk * nj * ni],
        }
    }

    /// Number of components.
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Spatial shape `(nk, nj, ni)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nk, self.nj, self.ni)
    }

    #[inline]
    fn offset(&self, c: usize, k: usize, j: usize, i: usize) -> usize {
        debug_assert!(c < self.ncomp && k < self.nk && j < self.nj && i < self.ni);
        ((c * self.nk + k) * self.nj + j) * self.ni + i
    }

    /// Value of component `c` at `(k, j, i)`.
    #[inline]
    pub fn get(&self, c: usize, k: usize, j: usize, i: usize) -> f64 {
        self.data[self.offset(c, k, j, i)]
    }

    /// Set component `c` at `(k, j, i)`.
    #[inline]
    pub fn set(&mut self, c: usize, k: usize, j: usize, i: usize, value: f64) {
        let o = self.offset(c, k, j, i);
        self.data[o] = value;
    }

    /// Mutable reference to component `c` at `(k, j, i)`.
    #[inline]
    pub fn get_mut(&mut self, c: usize, k: usize, j: usize, i: usize) -> &mut f64 {
        let o = self.offset(c, k, j, i);
        &mut self.data[o]
    }

    /// Variable `v` at `(k, j, i)`.
    #[inline]
    pub fn var(&self, v: Var, k: usize, j: usize, i: usize) -> f64 {
        self.get(v.index(), k, j, i)
    }

    /// The eight-variable state at `(k, j, i)`.
    ///
    /// Components beyond [`NPRIM`] are ignored.
    pub fn state(&self, k: usize, j: usize, i: usize) -> StateVector {
        debug_assert!(self.ncomp >= NPRIM);
        StateVector::from_fn(|v| self.get(v.index(), k, j, i))
    }

    /// Store an eight-variable state at `(k, j, i)`.
    pub fn set_state(&mut self, k: usize, j: usize, i: usize, s: &StateVector) {
        for (v, x) in s.iter() {
            self.set(v.index(), k, j, i, x);
        }
    }

    /// Set every value to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set every component at every zone of `region` to `value`.
    pub fn fill_region(&mut self, region: &IndexBox, value: f64) {
        for c in 0..self.ncomp {
            for (k, j, i) in region.iter() {
                self.set(c, k, j, i, value);
            }
        }
    }

    /// Copy every component over `region` from `src`, zone for zone.
    pub fn copy_region(&mut self, src: &GridArray, region: &IndexBox) {
        debug_assert_eq!(self.ncomp, src.ncomp);
        for c in 0..self.ncomp {
            for (k, j, i) in region.iter() {
                self.set(c, k, j, i, src.get(c, k, j, i));
            }
        }
    }

    /// Pack every component over `region` into a flat buffer,
    /// component-major then `(k, j, i)` in box order.
    pub fn pack(&self, region: &IndexBox) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.ncomp * region.len());
        for c in 0..self.ncomp {
            out.extend(region.iter().map(|(k, j, i)| self.get(c, k, j, i)));
        }
        out
    }

    /// Inverse of [`GridArray::pack`]. Returns `false` and writes nothing
    /// when `buf` has the wrong length for `region`.
    pub fn unpack(&mut self, region: &IndexBox, buf: &[f64]) -> bool {
        if buf.len() != self.ncomp * region.len() {
            return false;
        }
        let mut it = buf.iter();
        for c in 0..self.ncomp {
            for ((k, j, i), x) in region.iter().zip(&mut it) {
                self.set(c, k, j, i, *x);
            }
        }
        true
    }

    /// Raw values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw values.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl Index<(usize, usize, usize, usize)> for GridArray {
    type Output = f64;

    #[inline]
    fn index(&self, (c, k, j, i): (usize, usize, usize, usize)) -> &f64 {
        &self.data[self.offset(c, k, j, i)]
    }
}

impl IndexMut<(usize, usize, usize, usize)> for GridArray {
    #[inline]
    fn index_mut(&mut self, (c, k, j, i): (usize, usize, usize, usize)) -> &mut f64 {
        self.get_mut(c, k, j, i)
    }
}
