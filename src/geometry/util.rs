//! Geometric utility functions for beam-lattice calculations.
//!
//! This module groups the lattice point generators, the norm helpers used to
//! score reuse-matrix candidates, and the numeric conversions shared by the
//! colouring fold. Error types for these helpers live here so that every
//! submodule re-exports the same definitions.

use thiserror::Error;

pub mod conversions;
pub mod lattice_generation;
pub mod norms;

pub use conversions::*;
pub use lattice_generation::*;
pub use norms::*;

/// Errors that can occur while generating lattice points.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::geometry::util::LatticeGenerationError;
///
/// let err = LatticeGenerationError::InvalidSpacing {
///     parameter: "dx",
///     value: "0.0".to_string(),
/// };
/// assert!(err.to_string().contains("dx"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LatticeGenerationError {
    /// A spacing parameter is zero, or not strictly positive where it must be.
    #[error("Invalid lattice spacing: {parameter} = {value} (must be non-zero and, for derived lattices, positive)")]
    InvalidSpacing {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Its value, formatted.
        value: String,
    },
    /// A spacing or offset is NaN or infinite.
    #[error("Non-finite lattice parameter: {parameter} = {value}")]
    NonFiniteParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Its value, formatted.
        value: String,
    },
    /// The requested grid extent is too large to allocate.
    #[error("Lattice of ±{columns} columns by ±{rows} rows is too large: {details}")]
    TooManyPoints {
        /// Requested columns per side.
        columns: usize,
        /// Requested rows per side.
        rows: usize,
        /// Why the request was rejected.
        details: String,
    },
    /// A shear correction could not be represented as an integer column shift.
    #[error(transparent)]
    Conversion(#[from] ValueConversionError),
}

/// Errors from converting values between `f64` and integer types.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValueConversionError {
    /// Value is NaN or infinite.
    #[error("Cannot convert non-finite value {value}")]
    NonFinite {
        /// The offending value, formatted.
        value: String,
    },
    /// Value does not fit the target type.
    #[error("Value {value} is out of range for {to_type}")]
    OutOfRange {
        /// The offending value, formatted.
        value: String,
        /// Name of the target type.
        to_type: &'static str,
    },
}
