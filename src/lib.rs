//! # beam-reuse
//!
//! Frequency-reuse colouring for multi-beam satellite antennas.
//!
//! A multi-beam payload lays its beams out on a regular lattice in the
//! antenna's U-V plane and gives every beam one of `N` colours (frequency and
//! polarization slots). Beams sharing a colour interfere, so the pattern must
//! keep them as far apart as the colour count allows. This crate
//!
//! - generates square, rectangular, sheared and hexagonal beam lattices,
//! - searches for the integer reuse matrix that maximizes the co-channel reuse
//!   distance for a given colour count, on square or triangular grids,
//! - memoizes those matrices in a thread-safe, injectable cache, and
//! - assigns a colour to every beam by folding its grid index into the
//!   fundamental cell of the reuse matrix.
//!
//! # Basic Usage
//!
//! ```rust
//! use beam_reuse::prelude::*;
//!
//! // A hexagonal beam layout clipped to a disc of radius 4.
//! let beams = generate_hex_lattice(
//!     1.0,
//!     |x: f64, y: f64| x.hypot(y) <= 4.0,
//!     &LatticeOptions::with_bounds(6, 6),
//! )
//! .unwrap();
//!
//! let cache = ReuseMatrixCache::default();
//! let colors = assign_colors(
//!     &beams,
//!     7,
//!     LatticeType::Triangular,
//!     &ColoringOptions::default(),
//!     &cache,
//! )
//! .unwrap();
//!
//! assert_eq!(colors.len(), beams.len());
//! assert_eq!(colors.distinct_colors(), 7);
//! assert!(colors.colors().iter().all(|&c| (1..=7).contains(&c)));
//! ```
//!
//! # Reuse matrices
//!
//! A reuse matrix `F` is a 2×2 integer matrix with `det F = N`. Its columns
//! generate the sub-lattice of beams that share a colour, so the shortest
//! non-zero sub-lattice vector is the co-channel reuse distance. The search
//! keeps, for each `N`, the candidate with the longest reuse distance and,
//! among ties, the smallest Frobenius norm.
//!
//! ```rust
//! use beam_reuse::prelude::*;
//!
//! let cache = ReuseMatrixCache::default();
//! let f = cache.reuse_matrix(LatticeType::Triangular, 7).unwrap();
//! assert_eq!(f.determinant(), 7);
//! assert_eq!(f.rows(), [[1, -3], [2, 1]]);
//! ```
//!
//! # Caching
//!
//! [`ReuseMatrixCache`](core::reuse_cache::ReuseMatrixCache) is an ordinary
//! value: create one per application, or use
//! [`ReuseMatrixCache::shared`](core::reuse_cache::ReuseMatrixCache::shared)
//! for a process-wide instance. Lookups are lock-free; a miss searches a whole
//! batch of colour counts at once.
//!
//! # Configuration
//!
//! | Variable | Effect |
//! |---|---|
//! | `REUSE_SEARCH_GRID_MAX` | Search window for [`SearchConfig::from_env`](core::algorithms::reuse_search::SearchConfig::from_env) (default 25, so at most 625 colours). |
//! | `MAX_LATTICE_BYTES_SAFETY_CAP` | Largest lattice allocation in bytes (default 4 GiB). |

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Reuse matrices, their search and cache, and beam colouring.
pub mod core {
    /// Reuse-matrix search and beam colouring
    pub mod algorithms {
        pub mod coloring;
        pub mod reuse_search;
        pub use coloring::*;
        pub use reuse_search::*;
    }
    /// Hash collections used by the colouring fold
    pub mod collections;
    pub mod lattice_type;
    pub mod reuse_cache;
    pub mod reuse_matrix;
    // Re-export the `core` modules.
    pub use algorithms::*;
    pub use lattice_type::*;
    pub use reuse_cache::*;
    pub use reuse_matrix::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Planar points, small matrices and lattice generation.
pub mod geometry {
    pub mod matrix;
    pub mod point;
    /// Lattice generation, norms and numeric conversions
    pub mod util;
    pub use matrix::*;
    pub use point::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        algorithms::{coloring::*, reuse_search::*},
        lattice_type::*,
        reuse_cache::*,
        reuse_matrix::*,
    };

    pub use crate::core::collections::{FastHashMap, FastHashSet};

    // Re-export from geometry
    pub use crate::geometry::{point::*, util::*};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
