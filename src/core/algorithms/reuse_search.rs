//! Brute-force search for optimal reuse matrices.
//!
//! For every colour count `k` the search enumerates small integer matrices
//! with determinant `k`, maps their rows through the lattice shape transform
//! and keeps the one whose shortest sub-lattice vector (the co-channel reuse
//! distance) is longest. Among equally good matrices the one with the
//! smallest Frobenius norm wins, which favours compact, well-reduced bases.
//!
//! # Enumeration
//!
//! Candidates `M = [[x1, y1], [x2, y2]]` are visited with `x1` outermost and
//! `y2` innermost, with `x1, y1, y2 ∈ [0, L]` and `x2 ∈ [-L, L]`, where
//! `L = min(grid_max, ⌈√max_colours⌉ + 3)`. A candidate is discarded when
//!
//! - its determinant lies outside `[1, min(max_colours, grid_max²)]`,
//! - any entry exceeds `⌈√det⌉ + 3` in absolute value, or
//! - the angle between its rows is more than 45° away from a right angle.
//!
//! The winner for each determinant is stored transposed, so that its columns
//! generate the same-colour sub-lattice.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::core::lattice_type::LatticeType;
use crate::core::reuse_matrix::{ReuseMatrix, ReuseMatrixError};
use crate::geometry::matrix::mat_mul;
use crate::geometry::util::{frobenius_norm_squared, min_basis_squared_norm};

/// Default half-width of the enumeration window.
pub const DEFAULT_GRID_MAX: usize = 25;

/// Default minimum number of colour counts computed per search.
pub const DEFAULT_MIN_BATCH: usize = 10;

/// Absolute tolerance when comparing reuse distances.
///
/// Reuse distances on the triangular lattice carry round-off from the 60°
/// transform; scores closer than this are treated as ties.
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Extra entry headroom over `⌈√det⌉` allowed in a candidate.
const ENTRY_SLACK: usize = 3;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tuning for the reuse-matrix search.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::algorithms::reuse_search::{SearchConfig, SearchConfigBuilder};
///
/// let config = SearchConfig::default();
/// assert_eq!(config.grid_max, 25);
/// assert_eq!(config.max_color_count(), 625);
///
/// let small = SearchConfigBuilder::default().grid_max(6).build().unwrap();
/// assert_eq!(small.max_color_count(), 36);
/// assert_eq!(small.min_batch, 10);
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest absolute matrix entry considered; also bounds the colour count
    /// at `grid_max²`.
    pub grid_max: usize,
    /// Smallest high-water mark a cache extension searches up to.
    pub min_batch: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            grid_max: DEFAULT_GRID_MAX,
            min_batch: DEFAULT_MIN_BATCH,
        }
    }
}

impl SearchConfig {
    /// Defaults, with `grid_max` overridden by the `REUSE_SEARCH_GRID_MAX`
    /// environment variable when it holds a positive integer.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("REUSE_SEARCH_GRID_MAX")
            && let Ok(n) = v.trim().parse::<usize>()
            && n > 0
        {
            config.grid_max = n;
        }
        config
    }

    /// Largest colour count reachable with this configuration.
    #[must_use]
    pub const fn max_color_count(&self) -> usize {
        self.grid_max.saturating_mul(self.grid_max)
    }

    /// Check that `n_colours` lies in `[1, grid_max²]`.
    ///
    /// # Errors
    ///
    /// Returns [`ReuseMatrixError::UnachievableColorCount`] otherwise.
    pub const fn check_color_count(&self, n_colours: usize) -> Result<(), ReuseMatrixError> {
        if n_colours == 0 || n_colours > self.max_color_count() {
            return Err(ReuseMatrixError::UnachievableColorCount {
                requested: n_colours,
                max: self.max_color_count(),
            });
        }
        Ok(())
    }

    /// High-water mark a cache extension should search to for `n_colours`.
    #[must_use]
    pub fn batch_target(&self, n_colours: usize) -> usize {
        n_colours
            .max(self.min_batch)
            .min(self.max_color_count())
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Best reuse matrices found for a contiguous range of colour counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    first: usize,
    matrices: Vec<Option<ReuseMatrix>>,
    candidates_examined: usize,
}

impl SearchResult {
    /// Smallest colour count covered.
    #[must_use]
    pub const fn first(&self) -> usize {
        self.first
    }

    /// Largest colour count covered.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.first + self.matrices.len() - 1
    }

    /// Best matrix for `n_colours`, if it is covered and some candidate survived.
    #[must_use]
    pub fn get(&self, n_colours: usize) -> Option<&ReuseMatrix> {
        n_colours
            .checked_sub(self.first)
            .and_then(|i| self.matrices.get(i))
            .and_then(Option::as_ref)
    }

    /// Number of candidates that passed every filter and were scored.
    #[must_use]
    pub const fn candidates_examined(&self) -> usize {
        self.candidates_examined
    }

    /// Entries in colour-count order, `None` where nothing survived pruning.
    #[must_use]
    pub fn into_matrices(self) -> Vec<Option<ReuseMatrix>> {
        self.matrices
    }
}

// =============================================================================
// SEARCH
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct Best {
    distance: f64,
    frobenius: i64,
    rows: [[i64; 2]; 2],
}

impl Best {
    fn improves_on(&self, current: Option<&Self>) -> bool {
        current.is_none_or(|cur| {
            self.distance > cur.distance + SCORE_TOLERANCE
                || ((self.distance - cur.distance).abs() <= SCORE_TOLERANCE
                    && self.frobenius < cur.frobenius)
        })
    }
}

#[inline]
fn ceil_sqrt(n: usize) -> usize {
    let r = n.isqrt();
    if r * r == n { r } else { r + 1 }
}

/// Find the best reuse matrix for every colour count in `1..=max_colours`.
///
/// # Errors
///
/// Returns [`ReuseMatrixError::UnachievableColorCount`] if `max_colours` is
/// zero or exceeds `config.grid_max²`.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::algorithms::reuse_search::{search_reuse_matrices, SearchConfig};
/// use beam_reuse::core::lattice_type::LatticeType;
///
/// let result = search_reuse_matrices(LatticeType::Square, 4, &SearchConfig::default()).unwrap();
/// let four = result.get(4).unwrap();
/// assert_eq!(four.rows(), [[0, -2], [2, 0]]);
/// ```
pub fn search_reuse_matrices(
    lattice_type: LatticeType,
    max_colours: usize,
    config: &SearchConfig,
) -> Result<SearchResult, ReuseMatrixError> {
    search_reuse_matrix_range(lattice_type, 1, max_colours, config)
}

/// Find the best reuse matrix for every colour count in `first..=last`.
///
/// Candidates with determinants below `first` are skipped before scoring,
/// but the enumeration window is sized from `last`, so the winners are the
/// same as those of a full search up to `last`.
///
/// # Errors
///
/// Returns [`ReuseMatrixError::UnachievableColorCount`] if `first` or `last`
/// lies outside `[1, config.grid_max²]`, or if `first > last`.
pub fn search_reuse_matrix_range(
    lattice_type: LatticeType,
    first: usize,
    last: usize,
    config: &SearchConfig,
) -> Result<SearchResult, ReuseMatrixError> {
    config.check_color_count(last)?;
    config.check_color_count(first)?;
    if first > last {
        return Err(ReuseMatrixError::UnachievableColorCount {
            requested: first,
            max: last,
        });
    }

    let transform = lattice_type.shape_transform();
    let limit = config.grid_max.min(ceil_sqrt(last) + ENTRY_SLACK) as i64;
    let (first_det, last_det) = (first as i64, last as i64);

    let mut best: Vec<Option<Best>> = vec![None; last - first + 1];
    let mut candidates_examined = 0_usize;

    for x1 in 0..=limit {
        for y1 in 0..=limit {
            let angle1 = (y1 as f64).atan2(x1 as f64);
            for x2 in -limit..=limit {
                for y2 in 0..=limit {
                    let det = x1 * y2 - y1 * x2;
                    if det < first_det || det > last_det {
                        continue;
                    }
                    let bound = (ceil_sqrt(det as usize) + ENTRY_SLACK) as i64;
                    if x1 > bound || y1 > bound || x2.abs() > bound || y2 > bound {
                        continue;
                    }
                    let angle = (angle1 - (y2 as f64).atan2(x2 as f64)).abs();
                    if (FRAC_PI_2 - angle).abs() > FRAC_PI_4 {
                        continue;
                    }
                    candidates_examined += 1;

                    let shaped = mat_mul(
                        &[[x1 as f64, y1 as f64], [x2 as f64, y2 as f64]],
                        &transform,
                    );
                    let candidate = Best {
                        distance: min_basis_squared_norm(&shaped),
                        frobenius: frobenius_norm_squared(&shaped).round() as i64,
                        rows: [[x1, y1], [x2, y2]],
                    };
                    let slot = &mut best[(det - first_det) as usize];
                    if candidate.improves_on(slot.as_ref()) {
                        *slot = Some(candidate);
                    }
                }
            }
        }
    }

    let matrices = best
        .into_iter()
        .map(|slot| {
            slot.map(|b| ReuseMatrix::new(b.rows).map(|m| m.transpose()))
                .transpose()
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        %lattice_type,
        first,
        last,
        candidates_examined,
        found = matrices.iter().flatten().count(),
        "reuse-matrix search finished"
    );

    Ok(SearchResult {
        first,
        matrices,
        candidates_examined,
    })
}
