//! Common test fixtures for the tidally-locked transform.

use std::path::PathBuf;

use ndarray::{ArrayD, IxDyn};
use tempfile::TempDir;
use tl_common::{Axis, State, StateDocument};

/// Latitudes of the small scenario grid.
pub const SCENARIO_LAT: [f64; 3] = [-60.0, 0.0, 60.0];

/// Longitudes of the small scenario grid.
pub const SCENARIO_LON: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// A 3x4 state with one time step: constant `tsurf` (250K) and a uniform
/// wind `u = 3, v = 4`.
pub fn scenario_state() -> State {
    let lat = Axis::new("lat", SCENARIO_LAT.to_vec()).expect("valid latitude");
    let lon = Axis::new("lon", SCENARIO_LON.to_vec()).expect("valid longitude");
    let mut state = State::new(lat, lon);
    state.set_coordinate("t", vec![0.0]);
    for (name, value) in [("tsurf", 250.0), ("u", 3.0), ("v", 4.0)] {
        state
            .insert_field(name, ArrayD::from_elem(IxDyn(&[1, 3, 4]), value))
            .expect("scenario field fits grid");
    }
    state
}

/// A constant-valued state whose latitudes only cover [-60, 60].
pub fn band_limited_state(nlat: usize, nlon: usize, value: f64) -> State {
    let step = 120.0 / (nlat.max(2) - 1) as f64;
    let lat = Axis::new("lat", (0..nlat).map(|i| -60.0 + i as f64 * step).collect())
        .expect("valid latitude");
    let lon = Axis::regular_longitude(nlon, 0.0).expect("valid longitude");
    let mut state = State::new(lat, lon);
    state
        .insert_field("x", ArrayD::from_elem(IxDyn(&[nlat, nlon]), value))
        .expect("field fits grid");
    state
}

/// Write `state` as a JSON document inside a fresh temporary directory.
///
/// The directory is removed when the returned [`TempDir`] is dropped.
pub fn temp_state_document(state: &State, file_name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(file_name);
    StateDocument::from_state(state)
        .write(&path)
        .expect("write state document");
    (dir, path)
}
