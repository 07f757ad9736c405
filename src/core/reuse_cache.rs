//! Memoized reuse matrices.
//!
//! The search behind a reuse matrix is a four-deep enumeration, while the
//! colouring of a beam set needs exactly one matrix. [`ReuseMatrixCache`]
//! keeps one growable table per lattice type so that the cost is paid once
//! per high-water mark.
//!
//! # Concurrency
//!
//! Each table is an `ArcSwap` snapshot: lookups load the current `Arc` and
//! never block. Extensions are serialized per lattice type by a mutex held
//! for the whole search; a caller that waited on the mutex re-checks the
//! table before searching, so concurrent misses never duplicate work.
//! Extensions only append, so an entry never changes once published.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::core::algorithms::reuse_search::{SearchConfig, search_reuse_matrix_range};
use crate::core::lattice_type::LatticeType;
use crate::core::reuse_matrix::{ReuseMatrix, ReuseMatrixError};

/// Entry `k - 1` holds the best reuse matrix for `k` colours, or `None` if
/// the search found no candidate for `k`.
type Table = Vec<Option<ReuseMatrix>>;

#[derive(Debug, Default)]
struct LatticeTable {
    entries: ArcSwap<Table>,
    extend_lock: Mutex<()>,
}

impl LatticeTable {
    fn lookup(entries: &Table, n_colours: usize, max: usize) -> Result<ReuseMatrix, ReuseMatrixError> {
        entries
            .get(n_colours - 1)
            .copied()
            .flatten()
            .ok_or(ReuseMatrixError::UnachievableColorCount {
                requested: n_colours,
                max,
            })
    }
}

/// Thread-safe cache of reuse matrices, one table per [`LatticeType`].
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::lattice_type::LatticeType;
/// use beam_reuse::core::reuse_cache::ReuseMatrixCache;
///
/// let cache = ReuseMatrixCache::default();
/// assert_eq!(cache.populated(LatticeType::Triangular), 0);
///
/// let f = cache.get_or_compute(LatticeType::Triangular, 7).unwrap();
/// assert_eq!(f.determinant(), 7);
/// // The first miss fills a whole batch.
/// assert_eq!(cache.populated(LatticeType::Triangular), 10);
/// ```
#[derive(Debug, Default)]
pub struct ReuseMatrixCache {
    config: SearchConfig,
    square: LatticeTable,
    triangular: LatticeTable,
}

impl ReuseMatrixCache {
    /// Empty cache searching with `config`.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            square: LatticeTable::default(),
            triangular: LatticeTable::default(),
        }
    }

    /// Process-wide cache, configured from the environment on first use.
    ///
    /// See [`SearchConfig::from_env`].
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<ReuseMatrixCache> = OnceLock::new();
        SHARED.get_or_init(|| Self::new(SearchConfig::from_env()))
    }

    /// Search configuration used for extensions.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    const fn table(&self, lattice_type: LatticeType) -> &LatticeTable {
        match lattice_type {
            LatticeType::Square => &self.square,
            LatticeType::Triangular => &self.triangular,
        }
    }

    /// Highest colour count currently resident for `lattice_type`.
    #[must_use]
    pub fn populated(&self, lattice_type: LatticeType) -> usize {
        self.table(lattice_type).entries.load().len()
    }

    /// Resident reuse matrix for `n_colours`, without searching.
    #[must_use]
    pub fn get(&self, lattice_type: LatticeType, n_colours: usize) -> Option<ReuseMatrix> {
        let entries = self.table(lattice_type).entries.load();
        n_colours
            .checked_sub(1)
            .and_then(|i| entries.get(i).copied().flatten())
    }

    /// Reuse matrix for `n_colours`, extending the table if needed.
    ///
    /// A miss searches up to `max(n_colours, min_batch)`, clipped to
    /// `grid_max²`, so that nearby requests hit afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ReuseMatrixError::UnachievableColorCount`] if `n_colours` is
    /// zero, exceeds `grid_max²`, or has no surviving search candidate.
    pub fn get_or_compute(
        &self,
        lattice_type: LatticeType,
        n_colours: usize,
    ) -> Result<ReuseMatrix, ReuseMatrixError> {
        self.config.check_color_count(n_colours)?;
        let max = self.config.max_color_count();

        let snapshot = self.table(lattice_type).entries.load();
        if n_colours <= snapshot.len() {
            return LatticeTable::lookup(&snapshot, n_colours, max);
        }
        drop(snapshot);

        let entries = self.extend(lattice_type, self.config.batch_target(n_colours))?;
        LatticeTable::lookup(&entries, n_colours, max)
    }

    /// Same as [`get_or_compute`](Self::get_or_compute).
    ///
    /// # Errors
    ///
    /// See [`get_or_compute`](Self::get_or_compute).
    pub fn reuse_matrix(
        &self,
        lattice_type: LatticeType,
        n_colours: usize,
    ) -> Result<ReuseMatrix, ReuseMatrixError> {
        self.get_or_compute(lattice_type, n_colours)
    }

    /// Make every colour count up to `max_colours` resident.
    ///
    /// # Errors
    ///
    /// Returns [`ReuseMatrixError::UnachievableColorCount`] if `max_colours`
    /// is zero or exceeds `grid_max²`.
    pub fn preseed(
        &self,
        lattice_type: LatticeType,
        max_colours: usize,
    ) -> Result<(), ReuseMatrixError> {
        self.config.check_color_count(max_colours)?;
        self.extend(lattice_type, max_colours).map(drop)
    }

    /// Drop every resident entry for both lattice types.
    pub fn reset(&self) {
        for lattice_type in LatticeType::ALL {
            let table = self.table(lattice_type);
            let _guard = table
                .extend_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            table.entries.store(Arc::new(Vec::new()));
        }
        tracing::debug!("reuse-matrix cache reset");
    }

    fn extend(
        &self,
        lattice_type: LatticeType,
        target: usize,
    ) -> Result<Arc<Table>, ReuseMatrixError> {
        let table = self.table(lattice_type);
        // The guard protects no data of its own; a panic in another search
        // leaves the published snapshot intact.
        let _guard = table
            .extend_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = table.entries.load_full();
        if target <= current.len() {
            return Ok(current);
        }

        let first = current.len() + 1;
        tracing::debug!(%lattice_type, first, target, "extending reuse-matrix cache");
        let found = search_reuse_matrix_range(lattice_type, first, target, &self.config)?;

        let mut extended = Vec::with_capacity(target);
        extended.extend_from_slice(&current);
        extended.extend(found.into_matrices());
        let extended = Arc::new(extended);
        table.entries.store(Arc::clone(&extended));
        Ok(extended)
    }
}
