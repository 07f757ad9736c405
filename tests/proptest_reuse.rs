//! Property-based tests for reuse matrices and beam colouring.
//!
//! This module uses proptest to verify:
//! - Every reuse matrix has the requested determinant
//! - Lookups are idempotent and independent of the cache's fill history
//! - Colourings are periodic under reuse sub-lattice translations
//! - Colourings depend only on beam positions relative to the lattice scale

use beam_reuse::prelude::*;
use proptest::prelude::*;
use std::sync::LazyLock;

/// One cache for the whole module so that properties exercise the warm path.
static CACHE: LazyLock<ReuseMatrixCache> = LazyLock::new(ReuseMatrixCache::default);

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

fn lattice_type() -> impl Strategy<Value = LatticeType> {
    prop_oneof![Just(LatticeType::Square), Just(LatticeType::Triangular)]
}

/// Beam layout of the given lattice type with unit spacing.
fn layout(lattice_type: LatticeType, bounds: usize) -> Vec<Point2D> {
    let options = LatticeOptions::with_bounds(bounds, bounds);
    match lattice_type {
        LatticeType::Square => generate_square_lattice(1.0, accept_all, &options),
        LatticeType::Triangular => generate_hex_lattice(1.0, accept_all, &options),
    }
    .unwrap()
}

/// Physical offset of the grid translation `(u, v)` on a unit-spaced layout.
fn grid_offset(lattice_type: LatticeType, u: i64, v: i64) -> (f64, f64) {
    let (u, v) = (u as f64, v as f64);
    match lattice_type {
        LatticeType::Square => (u, v),
        LatticeType::Triangular => (0.5f64.mul_add(v, u), v * 3.0_f64.sqrt() / 2.0),
    }
}

// =============================================================================
// REUSE MATRIX PROPERTIES
// =============================================================================

proptest! {
    /// Property: the reuse matrix for N colours has determinant N.
    #[test]
    fn prop_determinant_equals_color_count(lattice_type in lattice_type(), n in 1usize..=80) {
        let f = CACHE.reuse_matrix(lattice_type, n).unwrap();
        prop_assert_eq!(f.determinant(), n as i64);
        prop_assert_eq!(f.color_count(), n);
    }

    /// Property: a cold cache returns the same matrix as the shared warm one.
    #[test]
    fn prop_lookup_is_idempotent(lattice_type in lattice_type(), n in 1usize..=40) {
        let warm = CACHE.reuse_matrix(lattice_type, n).unwrap();
        let again = CACHE.reuse_matrix(lattice_type, n).unwrap();
        let cold = ReuseMatrixCache::default().reuse_matrix(lattice_type, n).unwrap();
        prop_assert_eq!(warm, again);
        prop_assert_eq!(warm, cold);
    }

    /// Property: folding is periodic in the columns of the reuse matrix.
    #[test]
    fn prop_fold_is_periodic(
        lattice_type in lattice_type(),
        n in 2usize..=40,
        v in prop::array::uniform2(-50i64..=50),
        k in prop::array::uniform2(-5i64..=5),
    ) {
        let f = CACHE.reuse_matrix(lattice_type, n).unwrap();
        let folder = f.folder();
        let [c0, c1] = f.columns();
        let shifted = [
            v[0] + k[0] * c0[0] + k[1] * c1[0],
            v[1] + k[0] * c0[1] + k[1] * c1[1],
        ];
        prop_assert_eq!(folder.fold(v), folder.fold(shifted));
    }

    /// Property: exactly N fold classes per period.
    #[test]
    fn prop_fold_has_n_classes(lattice_type in lattice_type(), n in 1usize..=30) {
        let folder = CACHE.reuse_matrix(lattice_type, n).unwrap().folder();
        let mut classes = FastHashSet::default();
        for u in -12..=12 {
            for v in -12..=12 {
                classes.insert(folder.fold([u, v]).unwrap());
            }
        }
        prop_assert_eq!(classes.len(), n);
    }
}

// =============================================================================
// COLOURING PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: translating the whole layout by a reuse-lattice vector
    /// leaves every beam's colour unchanged.
    #[test]
    fn prop_coloring_is_translation_periodic(
        lattice_type in lattice_type(),
        n in 2usize..=30,
        k in prop::array::uniform2(-3i64..=3),
    ) {
        let beams = layout(lattice_type, 5);
        let f = CACHE.reuse_matrix(lattice_type, n).unwrap();
        let [c0, c1] = f.columns();
        let (dx, dy) = grid_offset(
            lattice_type,
            k[0] * c0[0] + k[1] * c1[0],
            k[0] * c0[1] + k[1] * c1[1],
        );
        let shifted: Vec<_> = beams.iter().map(|p| p.translated(dx, dy)).collect();

        let options = ColoringOptions::default();
        let base = assign_colors(&beams, n, lattice_type, &options, &CACHE).unwrap();
        let moved = assign_colors(&shifted, n, lattice_type, &options, &CACHE).unwrap();
        prop_assert_eq!(base, moved);
    }

    /// Property: scaling the layout does not change the colouring.
    #[test]
    fn prop_coloring_is_scale_invariant(
        lattice_type in lattice_type(),
        n in 2usize..=20,
        scale in prop::sample::select(vec![0.25, 0.5, 2.0, 3.0, 10.0]),
    ) {
        let beams = layout(lattice_type, 4);
        let scaled: Vec<_> = beams
            .iter()
            .map(|p| Point2D::new(p.x() * scale, p.y() * scale))
            .collect();

        let options = ColoringOptions::default();
        let base = assign_colors(&beams, n, lattice_type, &options, &CACHE).unwrap();
        let resized = assign_colors(&scaled, n, lattice_type, &options, &CACHE).unwrap();
        prop_assert_eq!(base, resized);
    }

    /// Property: every beam gets a colour in 1..=N and all N colours appear
    /// on a layout spanning several periods.
    #[test]
    fn prop_colors_cover_range(lattice_type in lattice_type(), n in 1usize..=25) {
        let beams = layout(lattice_type, 6);
        let colors =
            assign_colors(&beams, n, lattice_type, &ColoringOptions::default(), &CACHE).unwrap();
        prop_assert_eq!(colors.len(), beams.len());
        prop_assert!(colors.colors().iter().all(|&c| (1..=n).contains(&c)));
        prop_assert_eq!(colors.distinct_colors(), n);
    }
}
