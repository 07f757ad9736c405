//! Hash collection aliases.
//!
//! Fold-class lookups hash small integer keys on every beam, so the crate
//! uses `rustc_hash` throughout instead of the DoS-resistant default hasher.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

/// Hash map with the fast non-cryptographic hasher.
///
/// # Examples
///
/// ```rust
/// use beam_reuse::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<[i64; 2], usize> = FastHashMap::default();
/// map.insert([0, 1], 1);
/// assert_eq!(map.get(&[0, 1]), Some(&1));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Hash set with the fast non-cryptographic hasher.
pub type FastHashSet<T> = FxHashSet<T>;

/// Re-export the Entry enum for `FastHashMap`.
pub use std::collections::hash_map::Entry;

/// Create a [`FastHashMap`] with room for at least `capacity` entries.
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FxBuildHasher)
}
