//! Substellar rotation between geographic and tidally-locked coordinates.
//!
//! Points are converted to unit vectors, rotated, and converted back:
//!
//! 1. Rotate about the polar axis by `-lon_ss`, which moves the substellar
//!    point onto the prime meridian (the +x direction).
//! 2. Rotate about the y axis by -90 degrees, which carries +x onto +z.
//!
//! After both steps the substellar point is the north pole of the new
//! frame and the geographic north pole lies on the TL equator.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Rotation3, Vector3};
use tl_common::{normalize_longitude, TlError, TlResult};

/// Horizontal distance below which a unit vector is considered to sit on a
/// pole, where longitude is undefined.
const POLE_EPSILON: f64 = 1e-12;

/// Rotation carrying the substellar point onto the north pole.
///
/// All angles passed to the methods are in radians. Output longitudes lie in
/// `(-pi, pi]`; at a pole of the output frame the longitude is reported as 0.
#[derive(Debug, Clone)]
pub struct SubstellarRotation {
    /// Substellar longitude in degrees, normalized to `[0, 360)`
    lon_ss: f64,
    rotation: Rotation3<f64>,
}

impl SubstellarRotation {
    /// Create the rotation for a substellar longitude in degrees.
    ///
    /// Values outside `[0, 360)` are wrapped (450 becomes 90); non-finite
    /// values are rejected.
    pub fn new(lon_ss_deg: f64) -> TlResult<Self> {
        if !lon_ss_deg.is_finite() {
            return Err(TlError::InvalidLongitude(lon_ss_deg));
        }
        let lon_ss = normalize_longitude(lon_ss_deg);

        let to_prime_meridian =
            Rotation3::from_axis_angle(&Vector3::z_axis(), -lon_ss.to_radians());
        let tilt = Rotation3::from_axis_angle(&Vector3::y_axis(), -FRAC_PI_2);

        Ok(Self {
            lon_ss,
            rotation: tilt * to_prime_meridian,
        })
    }

    /// Substellar longitude in degrees, in `[0, 360)`.
    pub fn lon_ss(&self) -> f64 {
        self.lon_ss
    }

    /// Map a geographic point to tidally-locked coordinates.
    pub fn to_tidally_locked(&self, lat: f64, lon: f64) -> (f64, f64) {
        from_unit_vector(&(self.rotation * to_unit_vector(lat, lon)))
    }

    /// Map a tidally-locked point back to geographic coordinates.
    pub fn to_geographic(&self, lat_tl: f64, lon_tl: f64) -> (f64, f64) {
        from_unit_vector(
            &self
                .rotation
                .inverse_transform_vector(&to_unit_vector(lat_tl, lon_tl)),
        )
    }

    /// Angle between the geographic and tidally-locked local bases at a
    /// geographic point, returned as `(cos, sin)`.
    ///
    /// A vector with geographic components `(u, v)` (eastward, northward)
    /// has TL components `(u cos - v sin, u sin + v cos)`.
    pub fn basis_rotation(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (lat_tl, lon_tl) = self.to_tidally_locked(lat, lon);

        let east = east_vector(lon);
        let east_tl = self.rotation.inverse_transform_vector(&east_vector(lon_tl));
        let north_tl = self
            .rotation
            .inverse_transform_vector(&north_vector(lat_tl, lon_tl));

        let cos = east.dot(&east_tl);
        let sin = east.dot(&north_tl);
        let norm = cos.hypot(sin);
        if norm > 0.0 {
            (cos / norm, sin / norm)
        } else {
            (cos, sin)
        }
    }

    /// Express a geographic wind vector in the tidally-locked local basis.
    ///
    /// NaN components propagate.
    pub fn rotate_wind(&self, lat: f64, lon: f64, u: f64, v: f64) -> (f64, f64) {
        let (cos, sin) = self.basis_rotation(lat, lon);
        (u * cos - v * sin, u * sin + v * cos)
    }
}

fn to_unit_vector(lat: f64, lon: f64) -> Vector3<f64> {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

fn from_unit_vector(p: &Vector3<f64>) -> (f64, f64) {
    let lat = p.z.clamp(-1.0, 1.0).asin();
    let lon = if p.x.hypot(p.y) < POLE_EPSILON {
        0.0
    } else {
        p.y.atan2(p.x)
    };
    (lat, lon)
}

/// Local eastward unit vector at longitude `lon`.
fn east_vector(lon: f64) -> Vector3<f64> {
    let (sin_lon, cos_lon) = lon.sin_cos();
    Vector3::new(-sin_lon, cos_lon, 0.0)
}

/// Local northward unit vector at `(lat, lon)`.
fn north_vector(lat: f64, lon: f64) -> Vector3<f64> {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn angular_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
        to_unit_vector(a.0, a.1)
            .dot(&to_unit_vector(b.0, b.1))
            .clamp(-1.0, 1.0)
            .acos()
    }

    #[test]
    fn test_substellar_point_becomes_pole() {
        for lon_ss in [0.0, 45.0, 180.0, 270.0, 359.0] {
            let rot = SubstellarRotation::new(lon_ss).unwrap();
            let (lat_tl, _) = rot.to_tidally_locked(0.0, f64::to_radians(lon_ss));
            assert!(
                (lat_tl - FRAC_PI_2).abs() < 1e-12,
                "lon_ss={} gave lat_tl={}",
                lon_ss,
                lat_tl
            );
        }
    }

    #[test]
    fn test_antistellar_point_becomes_south_pole() {
        let rot = SubstellarRotation::new(180.0).unwrap();
        let (lat_tl, lon_tl) = rot.to_tidally_locked(0.0, 0.0);
        assert!((lat_tl + FRAC_PI_2).abs() < 1e-12);
        assert_eq!(lon_tl, 0.0);
    }

    #[test]
    fn test_geographic_pole_lands_on_tl_equator() {
        let rot = SubstellarRotation::new(100.0).unwrap();
        let (lat_tl, lon_tl) = rot.to_tidally_locked(FRAC_PI_2, 1.234);
        assert!(lat_tl.abs() < 1e-12);
        assert!(lon_tl.is_finite());
    }

    #[test]
    fn test_roundtrip() {
        let rot = SubstellarRotation::new(137.0).unwrap();
        for lat_deg in [-80.0, -45.0, -10.0, 0.0, 33.0, 71.0] {
            for lon_deg in [-170.0, -90.0, 0.0, 12.5, 90.0, 179.0] {
                let (lat, lon) = (f64::to_radians(lat_deg), f64::to_radians(lon_deg));
                let (lat_tl, lon_tl) = rot.to_tidally_locked(lat, lon);
                let (lat_back, lon_back) = rot.to_geographic(lat_tl, lon_tl);
                assert!((lat_back - lat).abs() < 1e-9);
                let dlon = (lon_back - lon).rem_euclid(2.0 * PI);
                assert!(dlon < 1e-9 || (2.0 * PI - dlon) < 1e-9);
            }
        }
    }

    #[test]
    fn test_preserves_angular_distance() {
        let rot = SubstellarRotation::new(250.0).unwrap();
        let a = (0.3, -1.2);
        let b = (-0.8, 2.5);
        let d_geo = angular_distance(a, b);
        let d_tl = angular_distance(rot.to_tidally_locked(a.0, a.1), rot.to_tidally_locked(b.0, b.1));
        assert!((d_geo - d_tl).abs() < 1e-12);
    }

    #[test]
    fn test_lon_ss_is_normalized() {
        assert_eq!(SubstellarRotation::new(450.0).unwrap().lon_ss(), 90.0);
        assert_eq!(SubstellarRotation::new(-90.0).unwrap().lon_ss(), 270.0);
        assert!(matches!(
            SubstellarRotation::new(f64::NAN),
            Err(TlError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_wind_rotation_east_of_substellar() {
        // 90 degrees east of the substellar point, eastward flow points away
        // from the TL pole, and northward flow becomes TL eastward.
        let rot = SubstellarRotation::new(0.0).unwrap();
        let lon = f64::to_radians(90.0);

        let (u_tl, v_tl) = rot.rotate_wind(0.0, lon, 10.0, 0.0);
        assert!(u_tl.abs() < 1e-9);
        assert!((v_tl + 10.0).abs() < 1e-9);

        let (u_tl, v_tl) = rot.rotate_wind(0.0, lon, 0.0, 10.0);
        assert!((u_tl - 10.0).abs() < 1e-9);
        assert!(v_tl.abs() < 1e-9);
    }

    #[test]
    fn test_wind_rotation_preserves_magnitude() {
        let rot = SubstellarRotation::new(180.0).unwrap();
        for (lat, lon) in [(0.4, 0.1), (-1.0, 2.0), (1.5, -3.0), (FRAC_PI_2, 0.0)] {
            let (u, v) = (12.0, -5.0);
            let (u_tl, v_tl) = rot.rotate_wind(lat, lon, u, v);
            assert!((u_tl.hypot(v_tl) - 13.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_points_are_finite() {
        let rot = SubstellarRotation::new(180.0).unwrap();
        let (c, s) = rot.basis_rotation(0.0, PI);
        assert!(c.is_finite() && s.is_finite());
        let (lat, lon) = rot.to_geographic(FRAC_PI_2, 0.0);
        assert!(lat.abs() < 1e-12);
        assert!((lon.abs() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_nan_propagates() {
        let rot = SubstellarRotation::new(180.0).unwrap();
        let (u, v) = rot.rotate_wind(0.2, 0.3, f64::NAN, 1.0);
        assert!(u.is_nan() && v.is_nan());
    }
}
