//! Planar beam-centre points.
//!
//! # Special Floating-Point Equality Semantics
//!
//! [`Point2D`] compares and hashes its coordinates through
//! [`OrderedFloat`], so `NaN` equals `NaN` and points can be used as keys
//! in hash-based collections. Compare the raw coordinates if IEEE 754
//! semantics are needed.

#![forbid(unsafe_code)]

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point in the U-V plane.
///
/// Beam centres arrive as angular U-V coordinates already projected onto a
/// plane; the point carries no identity beyond its two coordinates and is
/// immutable once created.
///
/// Serialized as a two-element array `[x, y]`.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::geometry::point::Point2D;
///
/// let p = Point2D::new(1.0, -2.0);
/// assert_eq!(p.x(), 1.0);
/// assert_eq!(p.coords(), &[1.0, -2.0]);
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    coords: [f64; 2],
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl Point2D {
    /// Create a point from its `x` (U) and `y` (V) coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { coords: [x, y] }
    }

    /// The origin of the U-V plane.
    #[inline]
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// The U coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.coords[0]
    }

    /// The V coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.coords[1]
    }

    /// Borrow the coordinates as an array.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; 2] {
        &self.coords
    }

    /// Copy the coordinates out as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [f64; 2] {
        self.coords
    }

    /// Returns `true` if both coordinates are finite.
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.coords[0].is_finite() && self.coords[1].is_finite()
    }

    /// Translate the point by `(dx, dy)`, returning a new point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use beam_reuse::geometry::point::Point2D;
    ///
    /// let p = Point2D::new(1.0, 1.0).translated(0.5, -1.0);
    /// assert_eq!(p, Point2D::new(1.5, 0.0));
    /// ```
    #[inline]
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.coords[0] + dx, self.coords[1] + dy)
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.coords[0] - other.coords[0]).hypot(self.coords[1] - other.coords[1])
    }
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

impl Hash for Point2D {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &c in &self.coords {
            OrderedFloat(c).hash(state);
        }
    }
}

impl PartialEq for Point2D {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(&a, &b)| OrderedFloat(a) == OrderedFloat(b))
    }
}

impl Eq for Point2D {}

/// Lexicographic ordering: `x` first, then `y`.
impl PartialOrd for Point2D {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point2D {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.coords[0])
            .cmp(&OrderedFloat(other.coords[0]))
            .then_with(|| OrderedFloat(self.coords[1]).cmp(&OrderedFloat(other.coords[1])))
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.coords[0], self.coords[1])
    }
}

impl From<[f64; 2]> for Point2D {
    #[inline]
    fn from(coords: [f64; 2]) -> Self {
        Self { coords }
    }
}

impl From<(f64, f64)> for Point2D {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for [f64; 2] {
    #[inline]
    fn from(point: Point2D) -> Self {
        point.coords
    }
}

impl From<&Point2D> for [f64; 2] {
    #[inline]
    fn from(point: &Point2D) -> Self {
        point.coords
    }
}

// =============================================================================
// TESTS
// =============================================================================
