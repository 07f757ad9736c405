//! Regular lattice point generation.
//!
//! Beam layouts are regular 2-D lattices: square and rectangular grids, and
//! the hexagonal (triangular) grid that most multi-beam antennas use. All of
//! them are produced by one sheared-grid generator, [`generate_regular_lattice`],
//! with an optional inclusion predicate that clips the grid to a coverage
//! region.

use crate::geometry::point::Point2D;

use super::conversions::round_to_i64;

// Re-export error type
pub use super::LatticeGenerationError;

/// Default maximum bytes allowed for lattice allocation.
///
/// The cap can be overridden via the `MAX_LATTICE_BYTES_SAFETY_CAP` environment variable.
const MAX_LATTICE_BYTES_SAFETY_CAP_DEFAULT: usize = 4_294_967_296; // 4 GiB

/// Default number of columns generated on each side of `x = 0`.
pub const DEFAULT_COLUMNS: usize = 70;

/// Default number of rows generated on each side of `y = 0`.
pub const DEFAULT_ROWS: usize = 70;

/// Get the maximum bytes allowed for lattice allocation.
///
/// Reads the `MAX_LATTICE_BYTES_SAFETY_CAP` environment variable if set,
/// otherwise returns the default value of 4 GiB.
fn max_lattice_bytes_safety_cap() -> usize {
    if let Ok(v) = std::env::var("MAX_LATTICE_BYTES_SAFETY_CAP")
        && let Ok(n) = v.parse::<usize>()
    {
        return n;
    }
    MAX_LATTICE_BYTES_SAFETY_CAP_DEFAULT
}

/// Format bytes in human-readable form (e.g., "4.2 GiB", "512 MiB").
fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Origin offset and extent of a generated lattice.
///
/// Column indices run over `[-m, m]` and row indices over `[-n, n]`, so an
/// unfiltered lattice holds `(2m + 1)(2n + 1)` points.
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::{LatticeOptions, LatticeOptionsBuilder};
///
/// let defaults = LatticeOptions::default();
/// assert_eq!((defaults.m, defaults.n), (70, 70));
///
/// let small = LatticeOptionsBuilder::default().m(3).n(2).dx0(0.5).build().unwrap();
/// assert_eq!((small.m, small.n, small.dx0, small.dy0), (3, 2, 0.5, 0.0));
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq)]
#[builder(default)]
pub struct LatticeOptions {
    /// Horizontal offset applied to every point.
    pub dx0: f64,
    /// Vertical offset applied to every point.
    pub dy0: f64,
    /// Columns on each side of the centre column.
    pub m: usize,
    /// Rows on each side of the centre row.
    pub n: usize,
}

impl Default for LatticeOptions {
    fn default() -> Self {
        Self {
            dx0: 0.0,
            dy0: 0.0,
            m: DEFAULT_COLUMNS,
            n: DEFAULT_ROWS,
        }
    }
}

impl LatticeOptions {
    /// Options with the default offsets and `m` columns / `n` rows per side.
    #[must_use]
    pub fn with_bounds(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            ..Self::default()
        }
    }
}

// =============================================================================
// GEOMETRIES
// =============================================================================

/// Lattice geometries understood by [`generate_lattice`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LatticeGeometry {
    /// General sheared grid: column spacing `dx`, row spacing `dy`, row shift `ds`.
    Regular {
        /// Spacing between columns.
        dx: f64,
        /// Spacing between rows.
        dy: f64,
        /// Horizontal shift added per row.
        ds: f64,
    },
    /// Axis-aligned grid with independent column and row spacing.
    Rectangular {
        /// Spacing between columns.
        dx: f64,
        /// Spacing between rows.
        dy: f64,
    },
    /// Axis-aligned grid with equal spacing on both axes.
    Square {
        /// Distance between neighbouring points.
        spacing: f64,
    },
    /// Triangular grid: rows `spacing·√3/2` apart, alternate rows shifted by half a period.
    Hexagonal {
        /// Distance between neighbouring points.
        spacing: f64,
    },
}

impl LatticeGeometry {
    /// Resolve the geometry into the `(dx, dy, ds)` triple of the regular generator.
    ///
    /// # Errors
    ///
    /// Returns `LatticeGenerationError::InvalidSpacing` if a derived geometry
    /// is given a spacing that is not strictly positive and finite.
    pub fn spacings(&self) -> Result<(f64, f64, f64), LatticeGenerationError> {
        match *self {
            Self::Regular { dx, dy, ds } => Ok((dx, dy, ds)),
            Self::Rectangular { dx, dy } => {
                require_positive("dx", dx)?;
                require_positive("dy", dy)?;
                Ok((dx, dy, 0.0))
            }
            Self::Square { spacing } => {
                require_positive("spacing", spacing)?;
                Ok((spacing, spacing, 0.0))
            }
            Self::Hexagonal { spacing } => {
                require_positive("spacing", spacing)?;
                Ok((spacing, spacing * 3.0_f64.sqrt() / 2.0, spacing / 2.0))
            }
        }
    }
}

fn require_positive(parameter: &'static str, value: f64) -> Result<(), LatticeGenerationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LatticeGenerationError::InvalidSpacing {
            parameter,
            value: format!("{value:?}"),
        })
    }
}

/// Inclusion predicate that keeps every point.
#[inline]
#[must_use]
pub const fn accept_all(_x: f64, _y: f64) -> bool {
    true
}

// =============================================================================
// GENERATORS
// =============================================================================

/// Generate the points of a sheared regular lattice.
///
/// Produces `(m·dx + n·ds + dx0, n·dy + dy0)` for `m ∈ [-M, M]`, `n ∈ [-N, N]`,
/// where each row's column index is shifted by `round(n·ds/dx)` (ties to even)
/// so the window of generated columns stays centred on `x = 0` instead of
/// drifting with the shear. Points for which `f_cond(x, y)` is `false` are
/// dropped. Rows are enumerated outer, columns inner, both ascending.
///
/// # Errors
///
/// * `LatticeGenerationError::InvalidSpacing` if `dx` is zero
/// * `LatticeGenerationError::NonFiniteParameter` if any spacing or offset is NaN or infinite
/// * `LatticeGenerationError::TooManyPoints` if the unfiltered grid would exceed
///   the memory safety cap
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::{accept_all, generate_regular_lattice, LatticeOptions};
///
/// let points =
///     generate_regular_lattice(1.0, 1.0, 0.5, accept_all, &LatticeOptions::with_bounds(2, 1))
///         .unwrap();
/// assert_eq!(points.len(), 15);
///
/// assert!(generate_regular_lattice(0.0, 1.0, 0.0, accept_all, &LatticeOptions::default()).is_err());
/// ```
pub fn generate_regular_lattice<F>(
    dx: f64,
    dy: f64,
    ds: f64,
    f_cond: F,
    options: &LatticeOptions,
) -> Result<Vec<Point2D>, LatticeGenerationError>
where
    F: Fn(f64, f64) -> bool,
{
    for (parameter, value) in [
        ("dx", dx),
        ("dy", dy),
        ("ds", ds),
        ("dx0", options.dx0),
        ("dy0", options.dy0),
    ] {
        if !value.is_finite() {
            return Err(LatticeGenerationError::NonFiniteParameter {
                parameter,
                value: format!("{value:?}"),
            });
        }
    }
    if dx == 0.0 {
        return Err(LatticeGenerationError::InvalidSpacing {
            parameter: "dx",
            value: format!("{dx:?}"),
        });
    }

    let too_many = || LatticeGenerationError::TooManyPoints {
        columns: options.m,
        rows: options.n,
        details: "Requested lattice size overflows usize".to_string(),
    };
    let columns = options
        .m
        .checked_mul(2)
        .and_then(|c| c.checked_add(1))
        .ok_or_else(too_many)?;
    let rows = options
        .n
        .checked_mul(2)
        .and_then(|r| r.checked_add(1))
        .ok_or_else(too_many)?;
    let total_points = columns.checked_mul(rows).ok_or_else(too_many)?;

    let total_bytes = total_points.saturating_mul(core::mem::size_of::<Point2D>());
    let cap = max_lattice_bytes_safety_cap();
    if total_bytes > cap {
        return Err(LatticeGenerationError::TooManyPoints {
            columns: options.m,
            rows: options.n,
            details: format!(
                "Requested lattice requires {} (> cap {})",
                format_bytes(total_bytes),
                format_bytes(cap)
            ),
        });
    }

    let m_max = i64::try_from(options.m).map_err(|_| too_many())?;
    let n_max = i64::try_from(options.n).map_err(|_| too_many())?;

    // Filters usually keep a small part of the bounding grid.
    let mut points = Vec::new();
    for n in -n_max..=n_max {
        let row = n as f64;
        let shift = round_to_i64(row * ds / dx)?;
        let y = row.mul_add(dy, options.dy0);
        for m in -m_max..=m_max {
            let x = ((m - shift) as f64).mul_add(dx, row.mul_add(ds, options.dx0));
            if f_cond(x, y) {
                points.push(Point2D::new(x, y));
            }
        }
    }

    Ok(points)
}

/// Generate an axis-aligned rectangular lattice (`ds = 0`).
///
/// # Errors
///
/// `LatticeGenerationError::InvalidSpacing` unless both spacings are strictly
/// positive; otherwise as [`generate_regular_lattice`].
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::{accept_all, generate_rect_lattice, LatticeOptions};
///
/// let points = generate_rect_lattice(2.0, 1.0, accept_all, &LatticeOptions::with_bounds(1, 1)).unwrap();
/// assert_eq!(points.len(), 9);
/// assert_eq!(points[0].to_array(), [-2.0, -1.0]);
/// ```
pub fn generate_rect_lattice<F>(
    dx: f64,
    dy: f64,
    f_cond: F,
    options: &LatticeOptions,
) -> Result<Vec<Point2D>, LatticeGenerationError>
where
    F: Fn(f64, f64) -> bool,
{
    generate_lattice(LatticeGeometry::Rectangular { dx, dy }, f_cond, options)
}

/// Generate a square lattice (`dx = dy = spacing`, `ds = 0`).
///
/// # Errors
///
/// `LatticeGenerationError::InvalidSpacing` unless `spacing` is strictly
/// positive; otherwise as [`generate_regular_lattice`].
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::{accept_all, generate_square_lattice, LatticeOptions};
///
/// let points = generate_square_lattice(1.0, accept_all, &LatticeOptions::default()).unwrap();
/// assert_eq!(points.len(), 141 * 141);
/// ```
pub fn generate_square_lattice<F>(
    spacing: f64,
    f_cond: F,
    options: &LatticeOptions,
) -> Result<Vec<Point2D>, LatticeGenerationError>
where
    F: Fn(f64, f64) -> bool,
{
    generate_lattice(LatticeGeometry::Square { spacing }, f_cond, options)
}

/// Generate a hexagonal (triangular) lattice.
///
/// Same-row neighbours are `spacing` apart, rows are `spacing·√3/2` apart and
/// every other row is offset horizontally by half a period.
///
/// # Errors
///
/// `LatticeGenerationError::InvalidSpacing` unless `spacing` is strictly
/// positive; otherwise as [`generate_regular_lattice`].
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::{generate_hex_lattice, LatticeOptions};
///
/// // Keep only the beams within 1.1 of the origin: the centre and its six neighbours.
/// let points = generate_hex_lattice(
///     1.0,
///     |x: f64, y: f64| x.hypot(y) < 1.1,
///     &LatticeOptions::with_bounds(3, 3),
/// )
/// .unwrap();
/// assert_eq!(points.len(), 7);
/// ```
pub fn generate_hex_lattice<F>(
    spacing: f64,
    f_cond: F,
    options: &LatticeOptions,
) -> Result<Vec<Point2D>, LatticeGenerationError>
where
    F: Fn(f64, f64) -> bool,
{
    generate_lattice(LatticeGeometry::Hexagonal { spacing }, f_cond, options)
}

/// Generate the points of any [`LatticeGeometry`].
///
/// # Errors
///
/// See [`LatticeGeometry::spacings`] and [`generate_regular_lattice`].
pub fn generate_lattice<F>(
    geometry: LatticeGeometry,
    f_cond: F,
    options: &LatticeOptions,
) -> Result<Vec<Point2D>, LatticeGenerationError>
where
    F: Fn(f64, f64) -> bool,
{
    let (dx, dy, ds) = geometry.spacings()?;
    generate_regular_lattice(dx, dy, ds, f_cond, options)
}
