//! Reuse-lattice geometries.
//!
//! A reuse pattern lives on either a square grid or a triangular (hexagonal)
//! grid. The lattice type decides the shape transform used when scoring
//! candidate reuse matrices and the basis used to index beams on the grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::geometry::matrix::Mat2;

/// Errors produced when resolving a lattice type from a tag.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LatticeTypeError {
    /// The tag does not name a supported lattice type.
    #[error("Invalid lattice type {name:?}: expected \"square\" or \"triangular\"")]
    InvalidLatticeType {
        /// The rejected tag.
        name: String,
    },
}

/// Geometry of the reuse lattice.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::lattice_type::{LatticeType, LatticeTypeError};
///
/// assert_eq!("square".parse::<LatticeType>(), Ok(LatticeType::Square));
/// assert_eq!("Triangular".parse::<LatticeType>(), Ok(LatticeType::Triangular));
/// assert!(matches!(
///     "hexagonal".parse::<LatticeType>(),
///     Err(LatticeTypeError::InvalidLatticeType { .. })
/// ));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatticeType {
    /// Orthogonal reuse cells.
    Square,
    /// 60°-sheared reuse cells; denser optimal packings.
    Triangular,
}

impl LatticeType {
    /// Both supported lattice types, in a fixed order.
    pub const ALL: [Self; 2] = [Self::Square, Self::Triangular];

    /// Lowercase tag of the lattice type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Triangular => "triangular",
        }
    }

    /// Shape transform applied to integer reuse-matrix rows before scoring.
    ///
    /// Identity for `Square`. For `Triangular` the rows are the unit vectors
    /// `(1, 0)` and `(cos 60°, sin 60°)`, so an integer row `(a, b)` maps to
    /// the physical vector `a·(1, 0) + b·(cos 60°, sin 60°)`.
    #[must_use]
    pub fn shape_transform(self) -> Mat2 {
        match self {
            Self::Square => [[1.0, 0.0], [0.0, 1.0]],
            Self::Triangular => {
                let (sin60, cos60) = 60.0_f64.to_radians().sin_cos();
                [[1.0, 0.0], [cos60, sin60]]
            }
        }
    }

    /// Basis of the beam grid, one basis vector per column.
    ///
    /// Grid index `(i, j)` lies at `i·b₀ + j·b₁` from a reference beam, where
    /// `pitch` is the same-row beam spacing and `row_spacing` the distance
    /// between rows. On a triangular grid each row is offset by half a pitch
    /// from the row below.
    #[must_use]
    pub fn grid_basis(self, pitch: f64, row_spacing: f64) -> Mat2 {
        match self {
            Self::Square => [[pitch, 0.0], [0.0, row_spacing]],
            Self::Triangular => [[pitch, 0.5 * pitch], [0.0, row_spacing]],
        }
    }

    /// Factor applied to the minimum coordinate separations to obtain the
    /// beam spacing along each axis.
    ///
    /// On a triangular grid alternate rows interleave, so the smallest
    /// distinct-x separation is half the same-row spacing.
    #[must_use]
    pub const fn spacing_factor(self) -> f64 {
        match self {
            Self::Square => 1.0,
            Self::Triangular => 2.0,
        }
    }
}

impl fmt::Display for LatticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LatticeType {
    type Err = LatticeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(Self::Square),
            "triangular" => Ok(Self::Triangular),
            _ => Err(LatticeTypeError::InvalidLatticeType {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for LatticeType {
    type Error = LatticeTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parse_rejects_unsupported_tags() {
        for tag in ["hexagonal", "hex", "", "squares", "tri"] {
            assert_eq!(
                tag.parse::<LatticeType>(),
                Err(LatticeTypeError::InvalidLatticeType {
                    name: tag.to_string()
                })
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for lattice in LatticeType::ALL {
            assert_eq!(lattice.to_string().parse::<LatticeType>(), Ok(lattice));
        }
    }

    #[test]
    fn triangular_shape_transform_rows_are_unit_length() {
        let t = LatticeType::Triangular.shape_transform();
        assert_relative_eq!(t[1][0], 0.5, epsilon = 1e-15);
        assert_relative_eq!(t[1][0].hypot(t[1][1]), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn triangular_basis_carries_row_offset() {
        // Index (2, 3) on a unit hexagonal grid: three rows up, shifted 3/2.
        let b = LatticeType::Triangular.grid_basis(1.0, 3.0_f64.sqrt() / 2.0);
        let x = b[0][0].mul_add(2.0, b[0][1] * 3.0);
        let y = b[1][0].mul_add(2.0, b[1][1] * 3.0);
        assert_relative_eq!(x, 3.5);
        assert_relative_eq!(y, 1.5 * 3.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(LatticeType::Square.grid_basis(2.0, 3.0), [[2.0, 0.0], [0.0, 3.0]]);
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&LatticeType::Triangular).unwrap();
        assert_eq!(json, "\"triangular\"");
        let back: LatticeType = serde_json::from_str("\"square\"").unwrap();
        assert_eq!(back, LatticeType::Square);
    }
}
