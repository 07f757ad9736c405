//! Integer reuse matrices.
//!
//! A reuse matrix `F` is a 2×2 integer matrix whose columns span the
//! sub-lattice of beams that share a colour. Its determinant is the number of
//! colours in the pattern. Folding a grid index `v` subtracts the sub-lattice
//! vector `F·k` that brings `v` into the fundamental cell of `F`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::geometry::matrix::Mat2;

/// Errors for reuse-matrix construction and lookup.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReuseMatrixError {
    /// No reuse matrix exists (or can be searched) for the requested colour count.
    #[error("Unachievable color count {requested}: must be between 1 and {max}")]
    UnachievableColorCount {
        /// Requested number of colours.
        requested: usize,
        /// Largest colour count the search can reach.
        max: usize,
    },
    /// Entries do not form a matrix with a positive determinant.
    #[error("Reuse matrix {rows:?} has non-positive determinant {determinant}")]
    NonPositiveDeterminant {
        /// Offending rows.
        rows: [[i64; 2]; 2],
        /// Their determinant (saturated on overflow).
        determinant: i64,
    },
}

/// A 2×2 integer reuse matrix with a positive determinant.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::reuse_matrix::ReuseMatrix;
///
/// let f = ReuseMatrix::new([[0, -2], [2, 0]]).unwrap();
/// assert_eq!(f.determinant(), 4);
/// assert_eq!(f.color_count(), 4);
/// assert_eq!(f.columns(), [[0, 2], [-2, 0]]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[[i64; 2]; 2]", into = "[[i64; 2]; 2]")]
pub struct ReuseMatrix {
    rows: [[i64; 2]; 2],
}

impl ReuseMatrix {
    /// Build a reuse matrix from its rows.
    ///
    /// # Errors
    ///
    /// Returns [`ReuseMatrixError::NonPositiveDeterminant`] if the determinant
    /// is below one or overflows `i64`.
    pub fn new(rows: [[i64; 2]; 2]) -> Result<Self, ReuseMatrixError> {
        match checked_determinant(&rows) {
            Some(det) if det >= 1 => Ok(Self { rows }),
            det => Err(ReuseMatrixError::NonPositiveDeterminant {
                rows,
                determinant: det.unwrap_or(i64::MAX),
            }),
        }
    }

    /// Rows of the matrix.
    #[must_use]
    pub const fn rows(&self) -> [[i64; 2]; 2] {
        self.rows
    }

    /// Columns of the matrix: the generators of the same-colour sub-lattice.
    #[must_use]
    pub const fn columns(&self) -> [[i64; 2]; 2] {
        let [[a, b], [c, d]] = self.rows;
        [[a, c], [b, d]]
    }

    /// Transposed matrix.
    #[must_use]
    pub const fn transpose(&self) -> Self {
        Self {
            rows: self.columns(),
        }
    }

    /// Exact integer determinant.
    #[must_use]
    pub const fn determinant(&self) -> i64 {
        let [[a, b], [c, d]] = self.rows;
        a * d - b * c
    }

    /// Number of colours this matrix represents.
    #[must_use]
    pub const fn color_count(&self) -> usize {
        self.determinant().unsigned_abs() as usize
    }

    /// The matrix lifted to floating point.
    #[must_use]
    pub fn to_f64_rows(&self) -> Mat2 {
        self.rows.map(|row| row.map(|v| v as f64))
    }

    /// Prepare the fold into the fundamental cell of this matrix.
    #[must_use]
    pub const fn folder(&self) -> Folder {
        Folder {
            matrix: *self,
            det: self.determinant(),
        }
    }
}

#[inline]
fn checked_determinant(rows: &[[i64; 2]; 2]) -> Option<i64> {
    let [[a, b], [c, d]] = *rows;
    a.checked_mul(d)?.checked_sub(b.checked_mul(c)?)
}

impl TryFrom<[[i64; 2]; 2]> for ReuseMatrix {
    type Error = ReuseMatrixError;

    fn try_from(rows: [[i64; 2]; 2]) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<ReuseMatrix> for [[i64; 2]; 2] {
    fn from(m: ReuseMatrix) -> Self {
        m.rows
    }
}

impl fmt::Display for ReuseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [[a, b], [c, d]] = self.rows;
        write!(f, "[[{a}, {b}], [{c}, {d}]]")
    }
}

/// Folds integer grid indices into the fundamental cell of a reuse matrix.
///
/// `F⁻¹ = adj(F) / det(F)`, so the cell offset of an index is an exact
/// integer floor division and folding never depends on rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Folder {
    matrix: ReuseMatrix,
    det: i64,
}

impl Folder {
    /// The reuse matrix being folded against.
    #[must_use]
    pub const fn matrix(&self) -> &ReuseMatrix {
        &self.matrix
    }

    /// Fold `v` to `v - F·floor(F⁻¹·v)`.
    ///
    /// Indices that differ by an integer combination of the columns of `F`
    /// fold to the same representative, and exactly `det(F)` representatives
    /// exist.
    ///
    /// Returns `None` if an intermediate value overflows `i64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use beam_reuse::core::reuse_matrix::ReuseMatrix;
    ///
    /// let folder = ReuseMatrix::new([[0, -2], [2, 0]]).unwrap().folder();
    /// assert_eq!(folder.fold([3, -1]), folder.fold([1, 1]));
    /// assert_eq!(folder.fold([i64::MAX, i64::MAX]), None);
    /// ```
    #[must_use]
    pub fn fold(&self, v: [i64; 2]) -> Option<[i64; 2]> {
        let [[a, b], [c, d]] = self.matrix.rows;
        // Rows of adj(F) are (d, -b) and (-c, a); det(F) >= 1.
        let k0 = d
            .checked_mul(v[0])?
            .checked_sub(b.checked_mul(v[1])?)?
            .div_euclid(self.det);
        let k1 = a
            .checked_mul(v[1])?
            .checked_sub(c.checked_mul(v[0])?)?
            .div_euclid(self.det);
        let x = v[0].checked_sub(a.checked_mul(k0)?.checked_add(b.checked_mul(k1)?)?)?;
        let y = v[1].checked_sub(c.checked_mul(k0)?.checked_add(d.checked_mul(k1)?)?)?;
        Some([x, y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_determinant() {
        for rows in [[[0, 0], [0, 0]], [[1, 0], [0, -1]], [[2, 4], [1, 2]]] {
            assert!(matches!(
                ReuseMatrix::new(rows),
                Err(ReuseMatrixError::NonPositiveDeterminant { .. })
            ));
        }
        assert!(matches!(
            ReuseMatrix::new([[i64::MAX, 0], [0, i64::MAX]]),
            Err(ReuseMatrixError::NonPositiveDeterminant {
                determinant: i64::MAX,
                ..
            })
        ));
    }

    #[test]
    fn transpose_keeps_determinant() {
        let f = ReuseMatrix::new([[1, -3], [2, 1]]).unwrap();
        assert_eq!(f.transpose().rows(), [[1, 2], [-3, 1]]);
        assert_eq!(f.transpose().determinant(), 7);
        assert_eq!(f.to_string(), "[[1, -3], [2, 1]]");
    }

    #[test]
    fn fold_lands_in_fundamental_cell() {
        let folder = ReuseMatrix::new([[0, -2], [2, 0]]).unwrap().folder();
        let mut classes = std::collections::BTreeSet::new();
        for x in -4..4 {
            for y in -4..4 {
                classes.insert(folder.fold([x, y]).unwrap());
            }
        }
        assert_eq!(classes.len(), 4);
    }

    #[test]
    fn fold_is_periodic_in_columns() {
        let f = ReuseMatrix::new([[1, -3], [2, 1]]).unwrap();
        let folder = f.folder();
        let [c0, c1] = f.columns();
        for v in [[0, 0], [3, -2], [-5, 7]] {
            let shifted = [v[0] + 2 * c0[0] - c1[0], v[1] + 2 * c0[1] - c1[1]];
            assert_eq!(folder.fold(v), folder.fold(shifted));
        }
    }

    #[test]
    fn fold_is_exact_on_cell_boundaries() {
        // F⁻¹·v lands on half-integers for every odd v here.
        let f = ReuseMatrix::new([[1, -1], [1, 1]]).unwrap();
        let folder = f.folder();
        let mut classes = std::collections::BTreeSet::new();
        for x in -9..=9 {
            for y in -9..=9 {
                let r = folder.fold([x, y]).unwrap();
                assert_eq!(folder.fold(r), Some(r));
                classes.insert(r);
            }
        }
        assert_eq!(classes.len(), 2);
    }

    #[test]
    fn serde_rejects_singular_rows() {
        assert!(serde_json::from_str::<ReuseMatrix>("[[1,2],[2,4]]").is_err());
        let f: ReuseMatrix = serde_json::from_str("[[1,-1],[1,1]]").unwrap();
        assert_eq!(f.determinant(), 2);
    }
}
