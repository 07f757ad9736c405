//! Frequency-reuse colouring of beam lattices.
//!
//! Beams are snapped to integer grid indices, folded into the fundamental
//! cell of the reuse matrix for the requested colour count, and numbered by
//! fold class. Two beams share a colour exactly when their grid indices
//! differ by a vector of the reuse sub-lattice.
//!
//! # Pipeline
//!
//! 1. The beam spacing along each axis is the smallest positive gap between
//!    distinct rounded coordinates (doubled along `x` on a triangular grid,
//!    where alternate rows interleave).
//! 2. Each beam `p` becomes `v = round(B⁻¹ · (p - p₀))`, where `p₀` is the
//!    first beam and the columns of `B` span the beam grid. Measuring from a
//!    beam keeps every offset near an integer, whatever the layout's origin.
//! 3. `v` is folded to `v - F·floor(F⁻¹·v)` with the cached reuse matrix `F`,
//!    in exact integer arithmetic.
//! 4. Colours are numbered from 1 in order of first occurrence, starting with
//!    the anchor's class when an anchor is given.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::core::collections::{Entry, FastHashMap, FastHashSet, fast_hash_map_with_capacity};
use crate::core::lattice_type::{LatticeType, LatticeTypeError};
use crate::core::reuse_cache::ReuseMatrixCache;
use crate::core::reuse_matrix::{Folder, ReuseMatrix, ReuseMatrixError};
use crate::geometry::matrix::{Mat2, MatrixError, invert, mat_vec, to_la_matrix};
use crate::geometry::point::Point2D;
use crate::geometry::util::{round_to_digits, round_to_i64};

/// Default number of decimal digits kept when rounding coordinates.
pub const DEFAULT_PRECISION_DIGITS: u32 = 7;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors that can occur while colouring a beam set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ColoringError {
    /// The lattice type tag is not supported.
    #[error(transparent)]
    InvalidLatticeType(#[from] LatticeTypeError),
    /// Fewer than two distinct coordinates along an axis, so no spacing exists.
    #[error("Degenerate beam lattice: {distinct} distinct {axis} coordinate(s), need at least 2")]
    DegenerateLattice {
        /// Axis without a spacing (`"x"` or `"y"`).
        axis: &'static str,
        /// Number of distinct rounded coordinates found.
        distinct: usize,
    },
    /// Both an anchor coordinate and an anchor index were given in strict mode.
    #[error("Ambiguous anchor: coordinate {coord} and beam index {index} both given")]
    AmbiguousAnchor {
        /// The anchor coordinate.
        coord: Point2D,
        /// The anchor beam index.
        index: usize,
    },
    /// The anchor index does not refer to a beam.
    #[error("Anchor index {index} out of range for {len} beams")]
    AnchorOutOfRange {
        /// Requested anchor index.
        index: usize,
        /// Number of beams.
        len: usize,
    },
    /// A beam centre is NaN or infinite.
    #[error("Beam {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending beam.
        index: usize,
    },
    /// The anchor coordinate is NaN or infinite.
    #[error("Anchor coordinate {coord} is not finite")]
    NonFiniteAnchor {
        /// The offending coordinate.
        coord: Point2D,
    },
    /// A beam's grid index does not fit in `i64`.
    #[error("Grid index of beam {index} overflows")]
    IndexOverflow {
        /// Index of the offending beam, or the beam count for the anchor.
        index: usize,
    },
    /// The beam spacings give a grid basis that cannot be inverted.
    #[error("Beam grid basis cannot be inverted: {source}")]
    SingularBeamGrid {
        /// Underlying failure.
        source: MatrixError,
    },
    /// A deserialized colour lies outside `1..=n_colours`.
    #[error("Color {color} of beam {index} is outside 1..={n_colours}")]
    ColorOutOfRange {
        /// Index of the offending beam.
        index: usize,
        /// The offending colour.
        color: usize,
        /// Number of colours of the assignment.
        n_colours: usize,
    },
    /// Fewer labels than colours were supplied.
    #[error("{labels} color label(s) supplied for {required} colors")]
    InsufficientColorLabels {
        /// Number of labels supplied.
        labels: usize,
        /// Number of colours requested.
        required: usize,
    },
    /// Reuse-matrix lookup failed.
    #[error(transparent)]
    ReuseMatrix(#[from] ReuseMatrixError),
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for [`assign_colors`].
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::algorithms::coloring::{ColoringOptions, ColoringOptionsBuilder};
/// use beam_reuse::geometry::point::Point2D;
///
/// assert_eq!(ColoringOptions::default().precision_digits, 7);
///
/// let options = ColoringOptionsBuilder::default()
///     .first_color_coord(Point2D::new(0.0, 0.0))
///     .strict_anchor(true)
///     .build()
///     .unwrap();
/// assert_eq!(options.first_color_idx, None);
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq)]
#[builder(default)]
pub struct ColoringOptions {
    /// Decimal digits kept when rounding coordinates to measure the spacing.
    pub precision_digits: u32,
    /// Beam position whose class becomes colour 1.
    #[builder(setter(strip_option))]
    pub first_color_coord: Option<Point2D>,
    /// Index of the beam whose class becomes colour 1.
    #[builder(setter(strip_option))]
    pub first_color_idx: Option<usize>,
    /// Reject rather than resolve a coordinate and an index given together.
    pub strict_anchor: bool,
}

impl Default for ColoringOptions {
    fn default() -> Self {
        Self {
            precision_digits: DEFAULT_PRECISION_DIGITS,
            first_color_coord: None,
            first_color_idx: None,
            strict_anchor: false,
        }
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// Colour of every beam, in input order.
///
/// Colours are 1-based and never exceed [`n_colours`](Self::n_colours).
/// Deserialization rejects assignments that break this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColorAssignment")]
pub struct ColorAssignment {
    colors: Vec<usize>,
    n_colours: usize,
}

#[derive(Deserialize)]
struct RawColorAssignment {
    colors: Vec<usize>,
    n_colours: usize,
}

impl TryFrom<RawColorAssignment> for ColorAssignment {
    type Error = ColoringError;

    fn try_from(raw: RawColorAssignment) -> Result<Self, Self::Error> {
        let n_colours = raw.n_colours;
        if let Some((index, &color)) = raw
            .colors
            .iter()
            .enumerate()
            .find(|&(_, &c)| c == 0 || c > n_colours)
        {
            return Err(ColoringError::ColorOutOfRange {
                index,
                color,
                n_colours,
            });
        }
        Ok(Self {
            colors: raw.colors,
            n_colours,
        })
    }
}

impl ColorAssignment {
    /// Colour per beam.
    #[must_use]
    pub fn colors(&self) -> &[usize] {
        &self.colors
    }

    /// Consume the assignment, returning the colour per beam.
    #[must_use]
    pub fn into_colors(self) -> Vec<usize> {
        self.colors
    }

    /// Number of colours requested.
    #[must_use]
    pub const fn n_colours(&self) -> usize {
        self.n_colours
    }

    /// Number of beams.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.colors.len()
    }

    /// `true` if no beams were coloured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour of beam `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.colors.get(index).copied()
    }

    /// Number of distinct colours actually used.
    #[must_use]
    pub fn distinct_colors(&self) -> usize {
        self.colors.iter().collect::<FastHashSet<_>>().len()
    }

    /// Beams per colour; entry `c - 1` counts colour `c`.
    #[must_use]
    pub fn class_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_colours];
        for &c in &self.colors {
            if let Some(size) = c.checked_sub(1).and_then(|i| sizes.get_mut(i)) {
                *size += 1;
            }
        }
        sizes
    }

    /// Indices of the beams with colour `color`, ascending.
    #[must_use]
    pub fn beams_with_color(&self, color: usize) -> Vec<usize> {
        self.colors
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c == color).then_some(i))
            .collect()
    }

    /// Replace colour `c` by `labels[c - 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ColoringError::InsufficientColorLabels`] if fewer than
    /// `n_colours` labels are supplied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use beam_reuse::prelude::*;
    ///
    /// // A 2×2 block of beams in a checkerboard of two colours.
    /// let beams = generate_square_lattice(
    ///     1.0,
    ///     |x, y| (0.0..2.0).contains(&x) && (0.0..2.0).contains(&y),
    ///     &LatticeOptions::with_bounds(2, 2),
    /// )
    /// .unwrap();
    /// let cache = ReuseMatrixCache::default();
    /// let colors = assign_colors(&beams, 2, LatticeType::Square, &ColoringOptions::default(), &cache).unwrap();
    /// let labels = colors.map_labels(&["f1/LHCP", "f2/RHCP"]).unwrap();
    /// assert_eq!(labels, vec!["f1/LHCP", "f2/RHCP", "f2/RHCP", "f1/LHCP"]);
    /// ```
    pub fn map_labels<L: Clone>(&self, labels: &[L]) -> Result<Vec<L>, ColoringError> {
        if labels.len() < self.n_colours {
            return Err(ColoringError::InsufficientColorLabels {
                labels: labels.len(),
                required: self.n_colours,
            });
        }
        self.colors
            .iter()
            .map(|&c| {
                c.checked_sub(1)
                    .and_then(|i| labels.get(i))
                    .cloned()
                    .ok_or(ColoringError::InsufficientColorLabels {
                        labels: labels.len(),
                        required: c,
                    })
            })
            .collect()
    }
}

// =============================================================================
// GRID INDEXING
// =============================================================================

/// Smallest positive gap between distinct rounded values, and the number of
/// distinct values.
fn min_separation(values: impl Iterator<Item = f64>, digits: u32) -> (Option<f64>, usize) {
    let distinct: BTreeSet<OrderedFloat<f64>> = values
        .map(|v| OrderedFloat(round_to_digits(v, digits)))
        .collect();
    let gap = distinct
        .iter()
        .zip(distinct.iter().skip(1))
        .map(|(a, b)| b.0 - a.0)
        .filter(|&d| d > 0.0)
        .min_by(f64::total_cmp);
    (gap, distinct.len())
}

/// Maps beam centres to folded grid indices.
struct GridIndexer {
    origin: Point2D,
    pitch: f64,
    to_grid: Mat2,
    folder: Folder,
}

impl GridIndexer {
    fn new(
        beams: &[Point2D],
        lattice_type: LatticeType,
        matrix: ReuseMatrix,
        digits: u32,
    ) -> Result<Self, ColoringError> {
        let (min_x, distinct_x) = min_separation(beams.iter().map(Point2D::x), digits);
        let min_x = min_x.ok_or(ColoringError::DegenerateLattice {
            axis: "x",
            distinct: distinct_x,
        })?;
        let (min_y, distinct_y) = min_separation(beams.iter().map(Point2D::y), digits);
        let min_y = min_y.ok_or(ColoringError::DegenerateLattice {
            axis: "y",
            distinct: distinct_y,
        })?;

        // Basis in units of the pitch, so the LU pivots stay near one.
        let pitch = min_x * lattice_type.spacing_factor();
        let basis = lattice_type.grid_basis(1.0, min_y / pitch);
        let to_grid = invert(&to_la_matrix(&basis))
            .map_err(|source| ColoringError::SingularBeamGrid { source })?;

        Ok(Self {
            origin: beams.first().copied().unwrap_or_else(Point2D::origin),
            pitch,
            to_grid,
            folder: matrix.folder(),
        })
    }

    fn fold(&self, p: &Point2D, index: usize) -> Result<[i64; 2], ColoringError> {
        let overflow = || ColoringError::IndexOverflow { index };
        let offset = [
            (p.x() - self.origin.x()) / self.pitch,
            (p.y() - self.origin.y()) / self.pitch,
        ];
        let [u, v] = mat_vec(&self.to_grid, offset);
        let grid = [
            round_to_i64(u).map_err(|_| overflow())?,
            round_to_i64(v).map_err(|_| overflow())?,
        ];
        self.folder.fold(grid).ok_or_else(overflow)
    }
}

// =============================================================================
// ASSIGNMENT
// =============================================================================

fn resolve_anchor(
    beams: &[Point2D],
    options: &ColoringOptions,
) -> Result<Option<Point2D>, ColoringError> {
    let indexed = options
        .first_color_idx
        .map(|index| {
            beams
                .get(index)
                .copied()
                .ok_or(ColoringError::AnchorOutOfRange {
                    index,
                    len: beams.len(),
                })
        })
        .transpose()?;

    let anchor = match (options.first_color_coord, options.first_color_idx) {
        (Some(coord), Some(index)) => {
            if options.strict_anchor {
                return Err(ColoringError::AmbiguousAnchor { coord, index });
            }
            tracing::warn!(
                %coord,
                index,
                "both anchor coordinate and anchor index given; using the coordinate"
            );
            Some(coord)
        }
        (Some(coord), None) => Some(coord),
        (None, _) => indexed,
    };

    if let Some(coord) = anchor
        && !coord.is_finite()
    {
        return Err(ColoringError::NonFiniteAnchor { coord });
    }
    Ok(anchor)
}

/// Assign one of `n_colours` colours to every beam centre.
///
/// Beams whose grid indices differ by a vector of the reuse sub-lattice get
/// the same colour; the sub-lattice is the one maximizing the co-channel
/// reuse distance for `n_colours` on `lattice_type`. Colours are numbered
/// from 1 by first occurrence in input order. When an anchor is configured
/// its class is numbered 1 and the rest follow by first occurrence. An
/// anchor whose class holds none of the beams still claims colour 1, which
/// then goes unused.
///
/// The cache is extended if it does not yet hold `n_colours`.
///
/// # Errors
///
/// - [`ColoringError::ReuseMatrix`] if `n_colours` is zero or beyond the
///   search limit of the cache.
/// - [`ColoringError::NonFiniteCoordinate`] for a NaN or infinite beam.
/// - [`ColoringError::AmbiguousAnchor`], [`ColoringError::AnchorOutOfRange`]
///   or [`ColoringError::NonFiniteAnchor`] for an unusable anchor.
/// - [`ColoringError::DegenerateLattice`] if the beams do not span both axes.
/// - [`ColoringError::SingularBeamGrid`] if the row spacing is negligible
///   next to the beam pitch.
/// - [`ColoringError::IndexOverflow`] for beams too far from the first beam
///   relative to the spacing.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::prelude::*;
///
/// let beams = generate_square_lattice(1.0, |x, y| x >= 0.0 && y >= 0.0, &LatticeOptions::with_bounds(3, 3)).unwrap();
/// assert_eq!(beams.len(), 16);
///
/// let cache = ReuseMatrixCache::default();
/// let colors = assign_colors(&beams, 4, LatticeType::Square, &ColoringOptions::default(), &cache).unwrap();
/// assert_eq!(colors.class_sizes(), vec![4, 4, 4, 4]);
/// ```
pub fn assign_colors(
    beams: &[Point2D],
    n_colours: usize,
    lattice_type: LatticeType,
    options: &ColoringOptions,
    cache: &ReuseMatrixCache,
) -> Result<ColorAssignment, ColoringError> {
    cache.config().check_color_count(n_colours)?;
    if let Some(index) = beams.iter().position(|p| !p.is_finite()) {
        return Err(ColoringError::NonFiniteCoordinate { index });
    }
    let anchor = resolve_anchor(beams, options)?;

    if n_colours == 1 || beams.is_empty() {
        return Ok(ColorAssignment {
            colors: vec![1; beams.len()],
            n_colours,
        });
    }

    let matrix = cache.get_or_compute(lattice_type, n_colours)?;
    let indexer = GridIndexer::new(beams, lattice_type, matrix, options.precision_digits)?;

    let mut classes: FastHashMap<[i64; 2], usize> = fast_hash_map_with_capacity(n_colours);
    if let Some(coord) = anchor {
        classes.insert(indexer.fold(&coord, beams.len())?, 1);
    }

    let mut colors = Vec::with_capacity(beams.len());
    for (index, beam) in beams.iter().enumerate() {
        let key = indexer.fold(beam, index)?;
        let next = classes.len() + 1;
        let color = match classes.entry(key) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => *e.insert(next),
        };
        colors.push(color);
    }

    tracing::debug!(
        beams = beams.len(),
        n_colours,
        %lattice_type,
        %matrix,
        classes = classes.len(),
        "assigned beam colors"
    );

    Ok(ColorAssignment { colors, n_colours })
}

/// [`assign_colors`] with the lattice type given by name.
///
/// # Errors
///
/// Returns [`ColoringError::InvalidLatticeType`] if `lattice_type` is neither
/// `"square"` nor `"triangular"`, otherwise as [`assign_colors`].
pub fn assign_colors_by_name(
    beams: &[Point2D],
    n_colours: usize,
    lattice_type: &str,
    options: &ColoringOptions,
    cache: &ReuseMatrixCache,
) -> Result<ColorAssignment, ColoringError> {
    let lattice_type: LatticeType = lattice_type.parse()?;
    assign_colors(beams, n_colours, lattice_type, options, cache)
}
