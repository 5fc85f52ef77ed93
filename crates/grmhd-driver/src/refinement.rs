//! Mesh-refinement hooks, active only when `Mesh/refinement_adaptive` is on.

use std::fmt;

use grmhd_mesh::Container;

/// Refinement decision for one patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AmrTag {
    /// Split the patch.
    Refine,
    /// Merge the patch with its siblings.
    Derefine,
    /// Leave the patch as it is.
    #[default]
    Same,
}

impl fmt::Display for AmrTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Refine => "refine",
            Self::Derefine => "derefine",
            Self::Same => "same",
        })
    }
}

/// Coarse-to-fine boundary fill and refinement tagging.
pub trait Refinement: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Fill ghost zones that border a coarser patch.
    fn prolongate(&self, c: &mut Container);

    /// Tag the patch after the last stage of a step.
    fn check(&self, c: &Container) -> AmrTag;
}

/// Uniform mesh: nothing to prolongate, every patch stays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoRefinement;

impl Refinement for NoRefinement {
    fn name(&self) -> &str {
        "none"
    }

    fn prolongate(&self, _c: &mut Container) {}

    fn check(&self, _c: &Container) -> AmrTag {
        AmrTag::Same
    }
}
