//! End-to-end checks of the tidally-locked transform on synthetic planets.

use grid_processor::{
    build_target_grid, compare_global_means, geographic_nodes, transform_state,
    transform_with_config, TransformConfig, VariableRoles,
};
use projection::SubstellarRotation;
use test_utils::{
    assert_approx_eq, assert_rel_eq, band_limited_state, dayside_temperature, regular_state,
    scenario_state, solid_body_wind, zonal_field,
};
use tl_common::{Axis, MeanMode, NodePlacement, State, TlError};

#[test]
fn test_scenario_substellar_column_at_pole() {
    let source = scenario_state();
    let roles = VariableRoles::from_names(["tsurf", "u", "v"]);
    let target = transform_state(&source, &roles, (3, 4), 180.0, true).unwrap();

    let tsurf = target.field("tsurf").unwrap();
    assert_eq!(tsurf.shape(), &[1, 3, 4]);
    // The source only covers [-60, 60]; every covered node sees 250K.
    for value in tsurf.iter().filter(|v| !v.is_nan()) {
        assert_approx_eq!(*value, 250.0, 1e-9);
    }
    // The TL equator runs through the geographic poles, outside the source
    // latitudes, so the grid is only partly covered.
    assert!(tsurf.iter().any(|v| !v.is_nan()));
    assert!(tsurf.iter().any(|v| v.is_nan()));
}

#[test]
fn test_global_mean_preserved() {
    for lon_ss in [0.0, 37.0, 123.4, 180.0, 271.0, 450.0] {
        let mut source = regular_state(36, 72);
        source
            .insert_field("tsurf", dayside_temperature(&source, lon_ss, 1))
            .unwrap();

        let roles = VariableRoles::new().scalar("tsurf");
        let target = transform_state(&source, &roles, (36, 72), lon_ss, true).unwrap();

        let comparisons =
            compare_global_means(&source, &target, MeanMode::Strict, MeanMode::NanAware).unwrap();
        assert_eq!(comparisons.len(), 1);
        let cmp = &comparisons[0];
        assert_eq!(cmp.earth.len(), 1);
        assert_rel_eq!(cmp.tidally_locked[0], cmp.earth[0], 0.01);
        assert!(
            cmp.max_relative_difference() < 0.01,
            "lon_ss {}: {:?}",
            lon_ss,
            cmp
        );
    }
}

#[test]
fn test_repeated_seam_longitude_source() {
    // -180..180 inclusive, the last column repeating the first.
    let lon = Axis::new("lon", (0..37).map(|j| -180.0 + 10.0 * j as f64).collect()).unwrap();
    let mut source = State::new(
        Axis::regular_latitude(18, NodePlacement::CellCentered).unwrap(),
        lon,
    );
    source
        .insert_field("tsurf", dayside_temperature(&source, 180.0, 1))
        .unwrap();
    let (u, v) = solid_body_wind(&source, 10.0);
    source.insert_field("u", u).unwrap();
    source.insert_field("v", v).unwrap();

    let roles = VariableRoles::from_names(["tsurf", "u", "v"]);
    let target = transform_state(&source, &roles, (18, 36), 180.0, true).unwrap();
    assert_eq!(target.shape(), (18, 36));
    assert_eq!(target.lon().first(), 0.0);

    let earth = source.global_mean("tsurf", MeanMode::Strict).unwrap();
    let tl = target.global_mean("tsurf", MeanMode::NanAware).unwrap();
    assert_rel_eq!(tl[[0]], earth[[0]], 0.01);

    // Substellar column lands on the TL north pole row.
    let tsurf = target.field("tsurf").unwrap();
    assert!((0..36).all(|j| tsurf[[0, 17, j]] > 315.0));
}

#[test]
fn test_dayside_is_tl_north() {
    let lon_ss = 90.0;
    let mut source = regular_state(36, 72);
    source
        .insert_field("tsurf", dayside_temperature(&source, lon_ss, 1))
        .unwrap();
    let target = transform_state(&source, &VariableRoles::new().scalar("tsurf"), (36, 72), lon_ss, true)
        .unwrap();

    // Northern TL hemisphere is the day side, southern the night side.
    let tsurf = target.field("tsurf").unwrap();
    for j in 0..72 {
        let north = tsurf[[0, 35, j]];
        let south = tsurf[[0, 0, j]];
        assert!(north > 320.0, "north {}", north);
        assert!(south.is_nan() || (south - 200.0).abs() < 1e-6);
    }
}

#[test]
fn test_nan_only_outside_source_coverage() {
    let source = band_limited_state(25, 72, 5.0);
    let rotation = SubstellarRotation::new(0.0).unwrap();
    let target = transform_state(&source, &VariableRoles::new().scalar("x"), (36, 72), 0.0, true)
        .unwrap();

    let grid = build_target_grid(&source, (36, 72)).unwrap();
    let (geo_lat, _) = geographic_nodes(&grid, &rotation);
    let field = target.field("x").unwrap();

    for ((i, j), lat) in geo_lat.indexed_iter() {
        let value = field[[i, j]];
        if lat.abs() > 60.0 + 1e-6 {
            assert!(value.is_nan(), "node ({}, {}) at lat {} should be NaN", i, j, lat);
        } else if lat.abs() < 60.0 - 1e-6 {
            assert_approx_eq!(value, 5.0, 1e-9);
        }
    }

    let strict = target.global_mean("x", MeanMode::Strict).unwrap();
    let aware = target.global_mean("x", MeanMode::NanAware).unwrap();
    assert!(strict.iter().all(|m| m.is_nan()));
    assert!(aware.iter().all(|m| (m - 5.0).abs() < 1e-9));
}

#[test]
fn test_solid_body_wind_speed_preserved() {
    let mut source = regular_state(36, 72);
    let (u, v) = solid_body_wind(&source, 20.0);
    source.insert_field("u", u).unwrap();
    source.insert_field("v", v).unwrap();

    let roles = VariableRoles::from_names(["u", "v"]);
    let target = transform_state(&source, &roles, (36, 72), 45.0, true).unwrap();
    let rotation = SubstellarRotation::new(45.0).unwrap();
    let (geo_lat, _) = geographic_nodes(&target, &rotation);

    let u_tl = target.field("u").unwrap();
    let v_tl = target.field("v").unwrap();
    for ((i, j), lat) in geo_lat.indexed_iter() {
        let (a, b) = (u_tl[[i, j]], v_tl[[i, j]]);
        if a.is_nan() {
            continue;
        }
        // Interpolated speed is a chord of cos(lat); allow interpolation error.
        let expected = 20.0 * lat.to_radians().cos();
        assert_approx_eq!(a.hypot(b), expected, 0.1);
    }
}

#[test]
fn test_latitude_only_field_on_antistellar_hemisphere() {
    let mut source = regular_state(18, 36);
    source.insert_field("z", zonal_field(&source, 10.0, 2.0)).unwrap();
    let config = TransformConfig {
        lon_ss: 0.0,
        ..TransformConfig::default()
    };
    let target = transform_with_config(&source, &VariableRoles::new().scalar("z"), &config).unwrap();
    assert_eq!(target.shape(), (18, 36));
    let z = target.field("z").unwrap();
    assert!(z.iter().filter(|v| !v.is_nan()).all(|v| (8.0..=12.0).contains(v)));
}

#[test]
fn test_configuration_errors() {
    let source = scenario_state();

    let err = transform_state(&source, &VariableRoles::new().scalar("ps"), (3, 4), 0.0, true)
        .unwrap_err();
    assert!(matches!(err, TlError::UnknownVariable(_)));

    let err = transform_state(&source, &VariableRoles::new().scalar("tsurf"), (3, 4), f64::NAN, true)
        .unwrap_err();
    assert!(matches!(err, TlError::InvalidLongitude(_)));
    assert!(err.is_configuration_error());
}
