//! Integration tests for beam lattice generation.
//!
//! Focus areas:
//! - Symmetry and spacing of the square and hexagonal generators
//! - Predicate filtering and origin offsets
//! - Error paths for invalid spacing and oversized grids

use approx::assert_relative_eq;
use beam_reuse::geometry::point::Point2D;
use beam_reuse::geometry::util::{
    LatticeGenerationError, LatticeGeometry, LatticeOptions, LatticeOptionsBuilder, accept_all,
    generate_hex_lattice, generate_lattice, generate_rect_lattice, generate_regular_lattice,
    generate_square_lattice,
};
use std::collections::{BTreeSet, HashSet};

// =============================================================================
// SQUARE LATTICE
// =============================================================================

#[test]
fn test_square_lattice_default_bounds_is_point_symmetric() {
    let points = generate_square_lattice(1.0, accept_all, &LatticeOptions::default()).unwrap();
    assert_eq!(points.len(), 141 * 141);

    let set: HashSet<Point2D> = points.iter().copied().collect();
    assert_eq!(set.len(), points.len(), "no duplicate points");
    for p in &points {
        assert!(
            set.contains(&Point2D::new(-p.x(), -p.y())),
            "missing mirror image of {p}"
        );
    }
}

#[test]
fn test_square_lattice_spacing_scales_coordinates() {
    let points =
        generate_square_lattice(2.5, accept_all, &LatticeOptions::with_bounds(1, 1)).unwrap();
    let xs: BTreeSet<_> = points.iter().map(|p| ordered_float::OrderedFloat(p.x())).collect();
    let xs: Vec<f64> = xs.into_iter().map(|x| x.0).collect();
    assert_eq!(xs, vec![-2.5, 0.0, 2.5]);
}

#[test]
fn test_rect_lattice_uses_independent_spacings() {
    let points = generate_rect_lattice(2.0, 3.0, accept_all, &LatticeOptions::with_bounds(1, 1))
        .unwrap();
    assert_eq!(points.first(), Some(&Point2D::new(-2.0, -3.0)));
    assert_eq!(points.last(), Some(&Point2D::new(2.0, 3.0)));
}

// =============================================================================
// HEXAGONAL LATTICE
// =============================================================================

#[test]
fn test_hex_lattice_row_spacing_and_offset() {
    let row_height = 3.0_f64.sqrt() / 2.0;
    let points = generate_hex_lattice(1.0, accept_all, &LatticeOptions::with_bounds(4, 4)).unwrap();
    assert_eq!(points.len(), 81);

    for p in &points {
        let row = (p.y() / row_height).round();
        assert_relative_eq!(p.y(), row * row_height, epsilon = 1e-12);
        // Odd rows sit half a period to the side of even rows.
        let offset = p.x() - 0.5 * row;
        assert_relative_eq!(offset, offset.round(), epsilon = 1e-12);
    }

    let mut rows: Vec<f64> = points.iter().map(Point2D::y).collect();
    rows.dedup();
    assert_eq!(rows.len(), 9);
    for pair in rows.windows(2) {
        assert_relative_eq!(pair[1] - pair[0], row_height, epsilon = 1e-12);
    }
}

#[test]
fn test_hex_lattice_window_stays_centred() {
    let points = generate_hex_lattice(1.0, accept_all, &LatticeOptions::with_bounds(3, 6)).unwrap();
    for row in points.chunks(7) {
        let mean = row.iter().map(Point2D::x).sum::<f64>() / 7.0;
        assert!(mean.abs() <= 0.5 + 1e-12, "row centred at {mean}");
    }
}

#[test]
fn test_hex_lattice_neighbours_are_equidistant() {
    let points = generate_hex_lattice(
        2.0,
        |x: f64, y: f64| x.hypot(y) < 2.1,
        &LatticeOptions::with_bounds(3, 3),
    )
    .unwrap();
    assert_eq!(points.len(), 7);
    let origin = Point2D::origin();
    for p in points.iter().filter(|p| **p != origin) {
        assert_relative_eq!(p.distance(&origin), 2.0, epsilon = 1e-12);
    }
}

// =============================================================================
// FILTERS, OFFSETS AND DISPATCH
// =============================================================================

#[test]
fn test_filter_and_offsets_compose() {
    let options = LatticeOptionsBuilder::default()
        .dx0(10.0)
        .dy0(-5.0)
        .m(2)
        .n(2)
        .build()
        .unwrap();
    let points = generate_square_lattice(1.0, |x, _| x >= 10.0, &options).unwrap();
    assert_eq!(points.len(), 3 * 5);
    assert!(points.iter().all(|p| p.x() >= 10.0 && (-7.0..=-3.0).contains(&p.y())));
}

#[test]
fn test_generate_lattice_dispatch_matches_specialised_generators() {
    let options = LatticeOptions::with_bounds(3, 2);
    assert_eq!(
        generate_lattice(LatticeGeometry::Hexagonal { spacing: 1.5 }, accept_all, &options).unwrap(),
        generate_hex_lattice(1.5, accept_all, &options).unwrap()
    );
    assert_eq!(
        generate_lattice(
            LatticeGeometry::Regular {
                dx: 1.0,
                dy: 2.0,
                ds: 0.0
            },
            accept_all,
            &options
        )
        .unwrap(),
        generate_rect_lattice(1.0, 2.0, accept_all, &options).unwrap()
    );
}

// =============================================================================
// ERROR PATHS
// =============================================================================

#[test]
fn test_zero_dx_is_invalid_spacing() {
    let result = generate_regular_lattice(0.0, 1.0, 0.5, accept_all, &LatticeOptions::default());
    assert!(matches!(
        result,
        Err(LatticeGenerationError::InvalidSpacing { parameter: "dx", .. })
    ));
}

#[test]
fn test_derived_generators_reject_non_positive_spacing() {
    for spacing in [0.0, -1.0] {
        assert!(matches!(
            generate_hex_lattice(spacing, accept_all, &LatticeOptions::default()),
            Err(LatticeGenerationError::InvalidSpacing { .. })
        ));
        assert!(matches!(
            generate_square_lattice(spacing, accept_all, &LatticeOptions::default()),
            Err(LatticeGenerationError::InvalidSpacing { .. })
        ));
    }
}

#[test]
fn test_non_finite_parameters_are_rejected() {
    assert!(matches!(
        generate_regular_lattice(1.0, f64::NAN, 0.0, accept_all, &LatticeOptions::default()),
        Err(LatticeGenerationError::NonFiniteParameter { .. })
    ));
}

#[test]
fn test_oversized_grid_is_rejected_before_allocation() {
    let options = LatticeOptions::with_bounds(usize::MAX / 4, usize::MAX / 4);
    assert!(matches!(
        generate_square_lattice(1.0, accept_all, &options),
        Err(LatticeGenerationError::TooManyPoints { .. })
    ));
}
