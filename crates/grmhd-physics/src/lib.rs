//! Ideal-GRMHD flux computation and constrained transport.
//!
//! Leaf to root:
//!
//! - [`state`]: per-zone conserved vector, physical flux and magnetosonic
//!   speeds of a primitive state.
//! - [`riemann`]: local Lax-Friedrichs blend of left and right face states
//!   into a numerical flux and a per-face maximal speed.
//! - [`flux_ct`]: edge EMFs and the rewrite of the magnetic flux components
//!   that keeps the corner divergence of B at round-off.
//! - [`update`]: flux divergence, geometric source term, stage combination
//!   and the Courant timestep.
//!
//! Zone loops run as rayon parallel iterators. Nothing in this crate
//! validates physical inputs: NaN in, NaN out.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod eos;
pub mod flux_ct;
pub mod reconstruction;
pub mod recovery;
pub mod riemann;
pub mod state;
pub mod update;

pub use eos::{EquationOfState, GammaLaw};
pub use flux_ct::{corner_div_b, flux_ct, interior_corners, max_corner_div_b, Emf};
pub use reconstruction::{DonorCell, FaceStates, Reconstruction};
pub use recovery::PrimitiveRecovery;
pub use riemann::{calculate_flux, llf_flux, lr_to_flux, FaceFlux};
pub use state::{get_state, mhd_calc, mhd_vchar, prim_to_flux, stress_row, FaceSample, FourVectors, LocalMetric, WaveSpeeds};
pub use update::{
    estimate_timestep, flux_divergence, prims_to_cons, source_term, update_conserved, zone_widths,
    StageWeights,
};
