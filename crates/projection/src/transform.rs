//! Array-level coordinate transforms.

use ndarray::{Array, Array2, ArrayView, Dimension, Zip};
use tl_common::{Axis, TlError, TlResult};

use crate::SubstellarRotation;

/// Rotate geographic coordinates (radians) into the tidally-locked frame.
///
/// `lat` and `lon` must have the same shape; the outputs have that shape
/// too. `lon_ss` is the substellar longitude in degrees.
pub fn transform_latlon_to_tl<D: Dimension>(
    lat: ArrayView<'_, f64, D>,
    lon: ArrayView<'_, f64, D>,
    lon_ss: f64,
) -> TlResult<(Array<f64, D>, Array<f64, D>)> {
    let rotation = SubstellarRotation::new(lon_ss)?;
    map_points(lat, lon, |la, lo| rotation.to_tidally_locked(la, lo))
}

/// Inverse of [`transform_latlon_to_tl`]: tidally-locked (radians) to geographic.
pub fn transform_tl_to_latlon<D: Dimension>(
    lat_tl: ArrayView<'_, f64, D>,
    lon_tl: ArrayView<'_, f64, D>,
    lon_ss: f64,
) -> TlResult<(Array<f64, D>, Array<f64, D>)> {
    let rotation = SubstellarRotation::new(lon_ss)?;
    map_points(lat_tl, lon_tl, |la, lo| rotation.to_geographic(la, lo))
}

/// Where every node of a geographic grid lands in the tidally-locked frame.
///
/// Returns `(lat_tl, lon_tl)` in degrees, each shaped `(nlat, nlon)`. Handy
/// for overlaying the original grid points on a TL map.
pub fn tl_coordinates_of_grid(
    lat: &Axis,
    lon: &Axis,
    lon_ss: f64,
) -> TlResult<(Array2<f64>, Array2<f64>)> {
    let shape = (lat.len(), lon.len());
    let lat_2d = Array2::from_shape_fn(shape, |(i, _)| lat.values()[i].to_radians());
    let lon_2d = Array2::from_shape_fn(shape, |(_, j)| lon.values()[j].to_radians());

    let (lat_tl, lon_tl) = transform_latlon_to_tl(lat_2d.view(), lon_2d.view(), lon_ss)?;
    Ok((lat_tl.mapv(f64::to_degrees), lon_tl.mapv(f64::to_degrees)))
}

fn map_points<D, F>(
    lat: ArrayView<'_, f64, D>,
    lon: ArrayView<'_, f64, D>,
    f: F,
) -> TlResult<(Array<f64, D>, Array<f64, D>)>
where
    D: Dimension,
    F: Fn(f64, f64) -> (f64, f64),
{
    if lat.shape() != lon.shape() {
        return Err(TlError::shape_mismatch("lon", lat.shape(), lon.shape()));
    }

    let mut lat_out = Array::zeros(lat.raw_dim());
    let mut lon_out = Array::zeros(lat.raw_dim());
    Zip::from(&mut lat_out)
        .and(&mut lon_out)
        .and(&lat)
        .and(&lon)
        .for_each(|lat_o, lon_o, &la, &lo| {
            let (a, b) = f(la, lo);
            *lat_o = a;
            *lon_o = b;
        });
    Ok((lat_out, lon_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array1};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_same_shape_in_and_out() {
        let lat = Array2::from_elem((2, 3), 0.1);
        let lon = Array2::from_elem((2, 3), 0.2);
        let (lat_tl, lon_tl) = transform_latlon_to_tl(lat.view(), lon.view(), 180.0).unwrap();
        assert_eq!(lat_tl.shape(), &[2, 3]);
        assert_eq!(lon_tl.shape(), &[2, 3]);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let lat: Array1<f64> = Array1::zeros(3);
        let lon: Array1<f64> = Array1::zeros(4);
        let err = transform_latlon_to_tl(lat.view(), lon.view(), 0.0).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_array_roundtrip() {
        let lat = arr1(&[-1.2, -0.5, 0.0, 0.7, 1.3]);
        let lon = arr1(&[0.0, 1.0, 2.0, 3.0, -2.5]);
        let (lat_tl, lon_tl) = transform_latlon_to_tl(lat.view(), lon.view(), 42.0).unwrap();
        let (lat_back, lon_back) =
            transform_tl_to_latlon(lat_tl.view(), lon_tl.view(), 42.0).unwrap();
        for i in 0..lat.len() {
            assert!((lat_back[i] - lat[i]).abs() < 1e-9);
            let d = (lon_back[i] - lon[i]).rem_euclid(std::f64::consts::TAU);
            assert!(d < 1e-9 || std::f64::consts::TAU - d < 1e-9);
        }
    }

    #[test]
    fn test_scenario_grid_substellar_node() {
        let lat = Axis::new("lat", vec![-60.0, 0.0, 60.0]).unwrap();
        let lon = Axis::new("lon", vec![0.0, 90.0, 180.0, 270.0]).unwrap();
        let (lat_tl, _) = tl_coordinates_of_grid(&lat, &lon, 180.0).unwrap();
        assert_eq!(lat_tl.shape(), &[3, 4]);
        assert!((lat_tl[[1, 2]] - 90.0).abs() < 1e-9);
        assert!((lat_tl[[1, 0]] + 90.0).abs() < 1e-9);
        // Nodes 90 degrees from the substellar point sit on the TL equator.
        assert!(lat_tl[[1, 1]].abs() < 1e-9);
        assert!((lat_tl[[1, 2]].to_radians() - FRAC_PI_2).abs() < 1e-9);
    }
}
