//! Parameter and dispatch errors.
//!
//! These are the configuration-class failures: surfaced at construction or
//! dispatch time and fatal to the run. Numerical degeneracy is never an
//! error in this workspace; kernels propagate NaN instead.

use thiserror::Error;

/// A configuration or dispatch value the core cannot accept.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParameterError {
    /// A direction selector outside the supported set.
    #[error("unsupported direction selector {selector}")]
    UnsupportedDirection {
        /// The rejected selector.
        selector: usize,
    },

    /// The adiabatic index is not finite or not greater than one.
    #[error("adiabatic index must be finite and > 1, got {value}")]
    InvalidAdiabaticIndex {
        /// The rejected value.
        value: f64,
    },

    /// A required parameter was never provided.
    #[error("missing required parameter {block}/{key}")]
    MissingParameter {
        /// Parameter block name.
        block: String,
        /// Parameter key within the block.
        key: String,
    },

    /// A parameter value could not be interpreted as the requested type.
    #[error("parameter {block}/{key} = '{value}' is not a valid {expected}")]
    InvalidValue {
        /// Parameter block name.
        block: String,
        /// Parameter key within the block.
        key: String,
        /// The raw value as stored.
        value: String,
        /// Name of the expected type.
        expected: &'static str,
    },
}
