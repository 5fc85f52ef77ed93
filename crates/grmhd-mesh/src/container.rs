//! Field containers and the per-patch container collection.
//!
//! A [`Container`] bundles every array one integration sub-stage needs on
//! one patch: cell-centred primitives and conserved variables, one face
//! flux array per direction, and the per-face maximal wave speed. Stage
//! containers are registered by name in a [`ContainerCollection`].

use grmhd_core::{Direction, NPRIM};
use indexmap::IndexMap;

use crate::array::GridArray;
use crate::error::MeshError;
use crate::index::CellBounds;

/// Name of the container holding the state at the start of a step.
pub const BASE_CONTAINER: &str = "base";

/// Name of the rate-of-change accumulator container.
pub const DUDT_CONTAINER: &str = "dUdt";

/// All arrays of one sub-stage on one patch.
///
/// Fields are public so kernels can borrow disjoint arrays at once (read
/// `prims` while writing `fluxes`).
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    name: String,
    bounds: CellBounds,
    /// Cell-centred primitive variables `P`.
    pub prims: GridArray,
    /// Cell-centred conserved variables `U`. Also the accumulator in the
    /// `dUdt` container.
    pub cons: GridArray,
    /// Face fluxes, indexed by [`Direction::index`].
    pub fluxes: [GridArray; 3],
    /// Per-face maximal characteristic speed, one component per direction.
    pub ctop: GridArray,
}

impl Container {
    /// Zero-filled container over `bounds`.
    pub fn new(name: impl Into<String>, bounds: CellBounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            prims: GridArray::zeros(NPRIM, &bounds),
            cons: GridArray::zeros(NPRIM, &bounds),
            fluxes: [
                GridArray::zeros(NPRIM, &bounds),
                GridArray::zeros(NPRIM, &bounds),
                GridArray::zeros(NPRIM, &bounds),
            ],
            ctop: GridArray::zeros(3, &bounds),
        }
    }

    /// A copy of this container under a new name.
    pub fn new_like(&self, name: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.name = name.into();
        out
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index-space bounds of the patch this container covers.
    pub fn bounds(&self) -> &CellBounds {
        &self.bounds
    }

    /// Flux array for `dir`.
    pub fn flux(&self, dir: Direction) -> &GridArray {
        &self.fluxes[dir.index()]
    }

    /// Mutable flux array for `dir`.
    pub fn flux_mut(&mut self, dir: Direction) -> &mut GridArray {
        &mut self.fluxes[dir.index()]
    }
}

/// Named containers for one patch, in registration order.
#[derive(Clone, Debug, Default)]
pub struct ContainerCollection {
    containers: Vec<Container>,
    index: IndexMap<String, usize>,
}

impl ContainerCollection {
    /// Collection holding only `base`, registered under [`BASE_CONTAINER`]
    /// whatever its own name.
    pub fn with_base(base: Container) -> Self {
        let mut c = Self::default();
        let base = base.new_like(BASE_CONTAINER);
        c.index.insert(BASE_CONTAINER.to_string(), 0);
        c.containers.push(base);
        c
    }

    /// Register a container under its own name.
    ///
    /// # Errors
    ///
    /// [`MeshError::DuplicateContainer`] if the name is taken.
    pub fn add(&mut self, container: Container) -> Result<(), MeshError> {
        if self.index.contains_key(container.name()) {
            return Err(MeshError::DuplicateContainer {
                name: container.name().to_string(),
            });
        }
        self.index
            .insert(container.name().to_string(), self.containers.len());
        self.containers.push(container);
        Ok(())
    }

    /// Register a copy of `like` under `name`. A no-op if `name` already
    /// exists, so per-step registration can be repeated.
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownContainer`] if `like` is not registered.
    pub fn add_like(&mut self, name: &str, like: &str) -> Result<(), MeshError> {
        if self.contains(name) {
            return Ok(());
        }
        let copy = self.get(like)?.new_like(name);
        self.add(copy)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Container by name.
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownContainer`] if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<&Container, MeshError> {
        self.index
            .get(name)
            .map(|&n| &self.containers[n])
            .ok_or_else(|| MeshError::UnknownContainer {
                name: name.to_string(),
            })
    }

    /// Mutable container by name.
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownContainer`] if `name` is not registered.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Container, MeshError> {
        match self.index.get(name) {
            Some(&n) => Ok(&mut self.containers[n]),
            None => Err(MeshError::UnknownContainer {
                name: name.to_string(),
            }),
        }
    }

    /// Borrow `read` immutably and `write` mutably at the same time.
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownContainer`] if either name is not registered and
    /// [`MeshError::AliasedContainer`] if both names are the same.
    pub fn pair_mut(
        &mut self,
        read: &str,
        write: &str,
    ) -> Result<(&Container, &mut Container), MeshError> {
        let r = self.position(read)?;
        let w = self.position(write)?;
        if r == w {
            return Err(MeshError::AliasedContainer {
                name: read.to_string(),
            });
        }
        if r < w {
            let (lo, hi) = self.containers.split_at_mut(w);
            Ok((&lo[r], &mut hi[0]))
        } else {
            let (lo, hi) = self.containers.split_at_mut(r);
            Ok((&hi[0], &mut lo[w]))
        }
    }

    fn position(&self, name: &str) -> Result<usize, MeshError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| MeshError::UnknownContainer {
                name: name.to_string(),
            })
    }

    /// The base container.
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownContainer`] on a collection built without a base.
    pub fn base(&self) -> Result<&Container, MeshError> {
        self.get(BASE_CONTAINER)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Number of registered containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether no container is registered.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
