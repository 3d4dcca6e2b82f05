//! Regridding of wind-like vector fields.
//!
//! Components are interpolated in the source frame's local basis first and
//! then rotated, node by node, into the tidally-locked local east/north
//! basis.

use ndarray::{Array2, ArrayD, ArrayView2, Zip};
use projection::SubstellarRotation;
use tl_common::{State, TlError, TlResult};

use crate::regrid::Regridder;

/// Regrid a (u, v) pair with a prepared [`Regridder`] whose target points
/// are the geographic positions of tidally-locked grid nodes (see
/// [`crate::grid::geographic_nodes`]).
///
/// `u` is eastward and `v` northward in the geographic frame; the returned
/// pair is eastward/northward in the tidally-locked frame. NaN propagates.
pub fn regrid_wind(
    u: &ArrayD<f64>,
    v: &ArrayD<f64>,
    regridder: &Regridder,
    rotation: &SubstellarRotation,
) -> TlResult<(ArrayD<f64>, ArrayD<f64>)> {
    if u.shape() != v.shape() {
        return Err(TlError::shape_mismatch("v", u.shape(), v.shape()));
    }

    let mut u_tl = regridder.apply("u", u)?;
    let mut v_tl = regridder.apply("v", v)?;

    let basis: Vec<(f64, f64)> = regridder
        .target_lat()
        .iter()
        .zip(regridder.target_lon())
        .map(|(lat, lon)| rotation.basis_rotation(lat.to_radians(), lon.to_radians()))
        .collect();

    // Both outputs are freshly built in standard layout, so iteration order
    // matches node order within each leading slice.
    let nodes = basis.len();
    for (k, (uu, vv)) in u_tl.iter_mut().zip(v_tl.iter_mut()).enumerate() {
        let (cos, sin) = basis[k % nodes];
        let (east, north) = (*uu, *vv);
        *uu = east * cos - north * sin;
        *vv = east * sin + north * cos;
    }

    Ok((u_tl, v_tl))
}

/// Regrid and rotate a wind pair from `source` onto tidally-locked points
/// `target_tl_lat`/`target_tl_lon` (TL-frame degrees, same shape).
///
/// Each target point is mapped back to the geographic frame with the
/// inverse rotation, sampled there, and its wind rotated into the TL basis.
pub fn regrid_vector(
    u: &ArrayD<f64>,
    v: &ArrayD<f64>,
    source: &State,
    target_tl_lat: ArrayView2<'_, f64>,
    target_tl_lon: ArrayView2<'_, f64>,
    rotation: &SubstellarRotation,
) -> TlResult<(ArrayD<f64>, ArrayD<f64>)> {
    if target_tl_lat.shape() != target_tl_lon.shape() {
        return Err(TlError::shape_mismatch(
            "target lon",
            target_tl_lat.shape(),
            target_tl_lon.shape(),
        ));
    }

    let mut geo_lat = Array2::zeros(target_tl_lat.raw_dim());
    let mut geo_lon = Array2::zeros(target_tl_lat.raw_dim());
    Zip::from(&mut geo_lat)
        .and(&mut geo_lon)
        .and(&target_tl_lat)
        .and(&target_tl_lon)
        .for_each(|lat, lon, &lat_tl, &lon_tl| {
            let (la, lo) = rotation.to_geographic(lat_tl.to_radians(), lon_tl.to_radians());
            *lat = la.to_degrees();
            *lon = lo.to_degrees();
        });

    let regridder = Regridder::new(source.lat(), source.lon(), geo_lat.view(), geo_lon.view())?;
    regrid_wind(u, v, &regridder, rotation)
}
