//! Vector and matrix norm computations.
//!
//! The reuse-matrix search scores every candidate basis by the squared norms
//! of a handful of short lattice vectors, so these stay in squared form and
//! avoid the square root entirely.

use num_traits::Float;

/// Helper function to compute squared norm using generic arithmetic on T.
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::squared_norm;
///
/// assert_eq!(squared_norm(&[3.0, 4.0]), 25.0);
/// assert_eq!(squared_norm(&[1.0_f32, 2.0, 2.0]), 9.0);
/// ```
pub fn squared_norm<T, const D: usize>(coords: &[T; D]) -> T
where
    T: Float,
{
    coords.iter().fold(T::zero(), |acc, &x| acc + x * x)
}

/// Squared Frobenius norm of a `D×D` matrix given as rows.
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::frobenius_norm_squared;
///
/// assert_eq!(frobenius_norm_squared(&[[1.0, 2.0], [0.0, 2.0]]), 9.0);
/// ```
pub fn frobenius_norm_squared<T, const D: usize>(rows: &[[T; D]; D]) -> T
where
    T: Float,
{
    rows.iter()
        .fold(T::zero(), |acc, row| acc + squared_norm(row))
}

/// Smallest squared norm among the two basis rows, their sum and their difference.
///
/// For a reasonably reduced 2-D basis this is the squared length of the
/// shortest non-zero lattice vector.
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::min_basis_squared_norm;
///
/// // Rows (2, 0) and (0, 2): sum and difference have squared norm 8.
/// assert_eq!(min_basis_squared_norm(&[[2.0, 0.0], [0.0, 2.0]]), 4.0);
/// // Rows (1, 0) and (1, 1): their difference (0, -1) is as short as (1, 0).
/// assert_eq!(min_basis_squared_norm(&[[1.0, 0.0], [1.0, 1.0]]), 1.0);
/// ```
pub fn min_basis_squared_norm<T>(rows: &[[T; 2]; 2]) -> T
where
    T: Float,
{
    let [a, b] = *rows;
    let sum = [a[0] + b[0], a[1] + b[1]];
    let diff = [a[0] - b[0], a[1] - b[1]];
    [a, b, sum, diff]
        .iter()
        .map(squared_norm)
        .fold(T::infinity(), T::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_squared_norm_zero_and_negative() {
        assert_relative_eq!(squared_norm(&[0.0, 0.0]), 0.0);
        assert_relative_eq!(squared_norm(&[-3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_frobenius_identity() {
        assert_relative_eq!(frobenius_norm_squared(&[[1.0, 0.0], [0.0, 1.0]]), 2.0);
    }

    #[test]
    fn test_min_basis_norm_hexagonal() {
        // Rows of the 60° shear: (1, 0) and (1/2, √3/2); the difference has unit length too.
        let s = 3.0_f64.sqrt() / 2.0;
        let norm = min_basis_squared_norm(&[[1.0, 0.0], [0.5, s]]);
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_basis_norm_uses_sum() {
        // (2, 1) and (-1, -1): the sum (1, 0) is the shortest vector.
        assert_relative_eq!(min_basis_squared_norm(&[[2.0, 1.0], [-1.0, -1.0]]), 1.0);
    }
}
