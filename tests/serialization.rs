//! Serde round trips for the public value types.

use beam_reuse::prelude::*;

#[test]
fn test_point_serializes_as_array() {
    let p = Point2D::new(1.5, -0.25);
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, "[1.5,-0.25]");
    assert_eq!(serde_json::from_str::<Point2D>(&json).unwrap(), p);
}

#[test]
fn test_reuse_matrix_round_trip_and_validation() {
    let cache = ReuseMatrixCache::default();
    let f = cache.reuse_matrix(LatticeType::Triangular, 7).unwrap();
    let json = serde_json::to_string(&f).unwrap();
    assert_eq!(json, "[[1,-3],[2,1]]");
    assert_eq!(serde_json::from_str::<ReuseMatrix>(&json).unwrap(), f);

    // Singular and orientation-reversing matrices are rejected.
    assert!(serde_json::from_str::<ReuseMatrix>("[[1,2],[2,4]]").is_err());
    assert!(serde_json::from_str::<ReuseMatrix>("[[0,1],[1,0]]").is_err());
}

#[test]
fn test_lattice_type_tags() {
    for lattice_type in LatticeType::ALL {
        let json = serde_json::to_string(&lattice_type).unwrap();
        assert_eq!(json, format!("\"{lattice_type}\""));
        assert_eq!(serde_json::from_str::<LatticeType>(&json).unwrap(), lattice_type);
    }
    assert!(serde_json::from_str::<LatticeType>("\"hexagonal\"").is_err());
}

#[test]
fn test_search_config_defaults_fill_missing_fields() {
    let config: SearchConfig = serde_json::from_str(r#"{"grid_max": 12}"#).unwrap();
    assert_eq!(config.grid_max, 12);
    assert_eq!(config.min_batch, SearchConfig::default().min_batch);

    let json = serde_json::to_string(&SearchConfig::default()).unwrap();
    assert_eq!(serde_json::from_str::<SearchConfig>(&json).unwrap(), SearchConfig::default());
}

#[test]
fn test_color_assignment_round_trip() {
    let beams = generate_square_lattice(1.0, accept_all, &LatticeOptions::with_bounds(2, 2)).unwrap();
    let cache = ReuseMatrixCache::default();
    let colors =
        assign_colors(&beams, 5, LatticeType::Square, &ColoringOptions::default(), &cache).unwrap();

    let json = serde_json::to_string(&colors).unwrap();
    let back: ColorAssignment = serde_json::from_str(&json).unwrap();
    assert_eq!(back, colors);
    assert_eq!(back.n_colours(), 5);
}

#[test]
fn test_color_assignment_rejects_colors_beyond_count() {
    for json in [
        r#"{"colors":[1,2,6],"n_colours":5}"#,
        r#"{"colors":[0,1],"n_colours":2}"#,
    ] {
        assert!(serde_json::from_str::<ColorAssignment>(json).is_err(), "{json}");
    }
}
