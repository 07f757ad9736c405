//! Matrix operations.
//!
//! This module provides small, stack-allocated linear algebra helpers used by
//! the reuse-matrix search and the colouring fold. Integer reuse matrices are
//! lifted into `la-stack` matrices whenever a floating-point solve is needed.

#![forbid(unsafe_code)]

use la_stack::{DEFAULT_PIVOT_TOL, LaError, Matrix as LaMatrix, Vector as LaVector};
use thiserror::Error;

/// Internal linear algebra matrix type used by this crate for fixed-size operations.
pub type Matrix<const D: usize> = LaMatrix<D>;

/// Row-major 2×2 matrix of plain `f64` values.
pub type Mat2 = [[f64; 2]; 2];

/// Error type for matrix operations.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::geometry::matrix::MatrixError;
///
/// let err = MatrixError::SingularMatrix;
/// assert!(matches!(err, MatrixError::SingularMatrix));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// Matrix is singular.
    #[error("Matrix is singular!")]
    SingularMatrix,
    /// LU factorization or solve failed inside `la-stack`.
    #[error("Linear solve failed: {details}")]
    SolveFailed {
        /// Description of the underlying `la-stack` failure.
        details: String,
    },
}

/// Default tolerance for matrix singularity checks.
///
/// Reuse matrices have integer entries and determinants of at least one, so
/// anything below this is a genuinely singular input rather than round-off.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Lift a row-major `f64` array into an `la-stack` matrix.
#[inline]
#[must_use]
pub fn to_la_matrix(m: &Mat2) -> Matrix<2> {
    Matrix::<2>::from_rows(*m)
}

/// Compute an LU-based determinant, returning 0.0 for singular matrices.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::geometry::matrix::{determinant, Matrix};
///
/// let m = Matrix::<2>::zero();
/// assert_eq!(determinant(&m), 0.0);
///
/// let m = Matrix::<2>::from_rows([[2.0, 1.0], [1.0, 3.0]]);
/// assert!((determinant(&m) - 5.0).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn determinant<const D: usize>(m: &Matrix<D>) -> f64 {
    match m.det(0.0) {
        Ok(det) => det,
        Err(LaError::Singular { .. }) => 0.0,
        Err(LaError::NonFinite { .. }) => f64::NAN,
    }
}

/// Invert a 2×2 matrix.
///
/// The inverse is assembled column by column from two LU solves against the
/// unit vectors, so it shares the pivoting behaviour of every other solve in
/// the crate.
///
/// # Errors
///
/// Returns [`MatrixError::SingularMatrix`] if `|det(m)|` is below
/// [`SINGULARITY_TOLERANCE`], or [`MatrixError::SolveFailed`] if `la-stack`
/// rejects the factorization.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::geometry::matrix::{invert, to_la_matrix};
///
/// let inv = invert(&to_la_matrix(&[[2.0, 0.0], [0.0, 4.0]])).unwrap();
/// assert!((inv[0][0] - 0.5).abs() < 1e-12);
/// assert!((inv[1][1] - 0.25).abs() < 1e-12);
/// ```
pub fn invert(m: &Matrix<2>) -> Result<Mat2, MatrixError> {
    if determinant(m).abs() < SINGULARITY_TOLERANCE {
        return Err(MatrixError::SingularMatrix);
    }

    let lu = m
        .lu(DEFAULT_PIVOT_TOL)
        .map_err(|e| MatrixError::SolveFailed {
            details: format!("LU factorization failed: {e}"),
        })?;

    let mut inverse = [[0.0_f64; 2]; 2];
    for (col, unit) in [[1.0, 0.0], [0.0, 1.0]].into_iter().enumerate() {
        let x = lu
            .solve_vec(LaVector::<2>::new(unit))
            .map_err(|e| MatrixError::SolveFailed {
                details: format!("LU solve failed: {e}"),
            })?
            .into_array();
        inverse[0][col] = x[0];
        inverse[1][col] = x[1];
    }
    Ok(inverse)
}

/// Multiply a row-major 2×2 matrix by a column vector.
#[inline]
#[must_use]
pub fn mat_vec(m: &Mat2, v: [f64; 2]) -> [f64; 2] {
    [
        m[0][0].mul_add(v[0], m[0][1] * v[1]),
        m[1][0].mul_add(v[0], m[1][1] * v[1]),
    ]
}

/// Multiply two row-major 2×2 matrices.
#[inline]
#[must_use]
pub fn mat_mul(a: &Mat2, b: &Mat2) -> Mat2 {
    let mut out = [[0.0_f64; 2]; 2];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = a[i][0].mul_add(b[0][j], a[i][1] * b[1][j]);
        }
    }
    out
}
