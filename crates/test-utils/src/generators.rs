//! Synthetic states with analytic fields.
//!
//! Fields are smooth functions of position so interpolation error stays
//! small and expected values can be computed in closed form.

use ndarray::{Array2, Array3, ArrayD};
use tl_common::{Axis, NodePlacement, State};

/// A state on a regular cell-centered grid with longitudes starting at 0.
///
/// # Panics
///
/// Panics if either count is zero.
pub fn regular_state(nlat: usize, nlon: usize) -> State {
    State::new(
        Axis::regular_latitude(nlat, NodePlacement::CellCentered).expect("nlat > 0"),
        Axis::regular_longitude(nlon, 0.0).expect("nlon > 0"),
    )
}

/// Cosine of the great-circle angle between `(lat, lon)` and the
/// substellar point `(0, lon_ss)`, all in degrees.
pub fn substellar_cosine(lat: f64, lon: f64, lon_ss: f64) -> f64 {
    lat.to_radians().cos() * (lon - lon_ss).to_radians().cos()
}

/// Surface temperature of a tidally-locked planet in Kelvin.
///
/// Warm (330K) at the substellar point, a uniform 200K night side. Shape is
/// `(nt, nlat, nlon)`; every time step gets a small offset so time means are
/// distinguishable from single steps.
pub fn dayside_temperature(state: &State, lon_ss: f64, nt: usize) -> ArrayD<f64> {
    let lat = state.lat().values();
    let lon = state.lon().values();
    Array3::from_shape_fn((nt, lat.len(), lon.len()), |(t, i, j)| {
        let mu = substellar_cosine(lat[i], lon[j], lon_ss).max(0.0);
        200.0 + 130.0 * mu + t as f64
    })
    .into_dyn()
}

/// A smooth field that depends only on latitude: `base + amp * sin(lat)`.
pub fn zonal_field(state: &State, base: f64, amp: f64) -> ArrayD<f64> {
    let lat = state.lat().values();
    Array2::from_shape_fn(state.shape(), |(i, _)| base + amp * lat[i].to_radians().sin())
        .into_dyn()
}

/// Solid-body rotation about the geographic axis: `u = speed * cos(lat)`,
/// `v = 0`.
pub fn solid_body_wind(state: &State, speed: f64) -> (ArrayD<f64>, ArrayD<f64>) {
    let lat = state.lat().values();
    let u = Array2::from_shape_fn(state.shape(), |(i, _)| speed * lat[i].to_radians().cos());
    let v = Array2::zeros(state.shape());
    (u.into_dyn(), v.into_dyn())
}

/// Copy of `field` (last two axes lat/lon) with every cell poleward of
/// `max_abs_lat` set to NaN.
pub fn mask_poleward(field: &ArrayD<f64>, lat: &Axis, max_abs_lat: f64) -> ArrayD<f64> {
    let nlat = lat.len();
    let nlon = field.shape().last().copied().unwrap_or(0);
    let lat = lat.values();
    let mut masked = field.as_standard_layout().into_owned();
    for (k, value) in masked.iter_mut().enumerate() {
        let i = (k / nlon.max(1)) % nlat.max(1);
        if lat[i].abs() > max_abs_lat {
            *value = f64::NAN;
        }
    }
    masked
}
