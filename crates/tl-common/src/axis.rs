//! Grid axes for latitude/longitude grids.

use serde::{Deserialize, Serialize};

use crate::error::{TlError, TlResult};
use crate::FULL_CIRCLE_DEG;

/// Tolerance (degrees) when matching a longitude seam.
const SEAM_TOLERANCE: f64 = 1e-6;

/// How nodes are placed along a latitude axis spanning the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodePlacement {
    /// Nodes sit at the centers of equal-width cells (no node on a pole).
    #[default]
    CellCentered,
    /// Nodes are evenly spaced and include both poles.
    Inclusive,
}

/// A strictly monotonic sequence of coordinate values in degrees.
///
/// Axes may be increasing or decreasing; many model outputs store latitude
/// from north to south.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Axis {
    values: Vec<f64>,
}

impl Axis {
    /// Create an axis, validating that it is non-empty, finite and strictly
    /// monotonic.
    pub fn new(name: &str, values: Vec<f64>) -> TlResult<Self> {
        if values.is_empty() {
            return Err(TlError::invalid_axis(name, "axis is empty"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(TlError::invalid_axis(
                name,
                format!("non-finite value {}", bad),
            ));
        }
        if values.len() > 1 {
            let increasing = values[1] > values[0];
            let monotonic = values.windows(2).all(|w| {
                if increasing {
                    w[1] > w[0]
                } else {
                    w[1] < w[0]
                }
            });
            if !monotonic {
                return Err(TlError::invalid_axis(name, "values are not strictly monotonic"));
            }
        }
        Ok(Self { values })
    }

    /// Evenly spaced latitudes spanning -90..90 (increasing).
    pub fn regular_latitude(n: usize, placement: NodePlacement) -> TlResult<Self> {
        if n == 0 {
            return Err(TlError::invalid_axis("lat", "axis is empty"));
        }
        let values = match placement {
            NodePlacement::CellCentered => {
                let step = 180.0 / n as f64;
                (0..n).map(|i| -90.0 + (i as f64 + 0.5) * step).collect()
            }
            NodePlacement::Inclusive if n == 1 => vec![0.0],
            NodePlacement::Inclusive => {
                let step = 180.0 / (n - 1) as f64;
                (0..n).map(|i| -90.0 + i as f64 * step).collect()
            }
        };
        Self::new("lat", values)
    }

    /// Evenly spaced longitudes covering one full circle, starting at `start`.
    pub fn regular_longitude(n: usize, start: f64) -> TlResult<Self> {
        if n == 0 {
            return Err(TlError::invalid_axis("lon", "axis is empty"));
        }
        let step = FULL_CIRCLE_DEG / n as f64;
        Self::new("lon", (0..n).map(|j| start + j as f64 * step).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; axes are validated non-empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn min(&self) -> f64 {
        self.first().min(self.last())
    }

    pub fn max(&self) -> f64 {
        self.first().max(self.last())
    }

    /// True when values increase with index (single-node axes count as increasing).
    pub fn is_increasing(&self) -> bool {
        self.len() == 1 || self.values[1] > self.values[0]
    }

    /// Mean absolute spacing between nodes, or `None` for a single node.
    pub fn spacing(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        Some((self.last() - self.first()).abs() / (self.len() - 1) as f64)
    }

    /// Whether every step equals the mean spacing within `tolerance` degrees.
    pub fn is_regular(&self, tolerance: f64) -> bool {
        match self.spacing() {
            None => true,
            Some(step) => self
                .values
                .windows(2)
                .all(|w| ((w[1] - w[0]).abs() - step).abs() <= tolerance),
        }
    }

    /// Cell boundaries: midpoints between nodes, extended by half the
    /// adjacent spacing at each end. A single node gets `single_width`.
    ///
    /// The result has `len() + 1` entries and follows the axis direction.
    pub fn bounds(&self, single_width: f64) -> Vec<f64> {
        let n = self.len();
        if n == 1 {
            let half = single_width / 2.0;
            return vec![self.values[0] - half, self.values[0] + half];
        }
        let mut bounds = Vec::with_capacity(n + 1);
        bounds.push(self.values[0] - (self.values[1] - self.values[0]) / 2.0);
        for w in self.values.windows(2) {
            bounds.push((w[0] + w[1]) / 2.0);
        }
        bounds.push(self.values[n - 1] + (self.values[n - 1] - self.values[n - 2]) / 2.0);
        bounds
    }

    /// Latitude cell boundaries clamped to the poles.
    pub fn latitude_bounds(&self) -> Vec<f64> {
        self.bounds(180.0)
            .into_iter()
            .map(|b| b.clamp(-90.0, 90.0))
            .collect()
    }

    /// Whether the last node repeats the first one a full circle later, as
    /// in `-180, ..., 180` model output.
    pub fn has_repeated_seam(&self) -> bool {
        self.len() > 2 && ((self.last() - self.first()).abs() - FULL_CIRCLE_DEG).abs() < SEAM_TOLERANCE
    }

    /// Absolute longitude width of each cell in degrees. A repeated seam
    /// node gets zero width so the circle is not counted twice.
    pub fn longitude_widths(&self) -> Vec<f64> {
        let mut widths: Vec<f64> = self
            .bounds(FULL_CIRCLE_DEG)
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .collect();
        if self.has_repeated_seam() {
            if let Some(seam) = widths.last_mut() {
                *seam = 0.0;
            }
        }
        widths
    }

    /// Guess the node placement of a latitude axis: an axis touching a pole
    /// is `Inclusive`, anything else is treated as `CellCentered`.
    pub fn detect_latitude_placement(&self) -> NodePlacement {
        if self.len() > 1 && (self.max() - 90.0).abs() < 1e-6 && (self.min() + 90.0).abs() < 1e-6 {
            NodePlacement::Inclusive
        } else {
            NodePlacement::CellCentered
        }
    }
}

impl TryFrom<Vec<f64>> for Axis {
    type Error = TlError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Axis::new("axis", values)
    }
}

impl From<Axis> for Vec<f64> {
    fn from(axis: Axis) -> Self {
        axis.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_axes() {
        assert!(Axis::new("lat", vec![]).is_err());
        assert!(Axis::new("lat", vec![0.0, 0.0]).is_err());
        assert!(Axis::new("lat", vec![0.0, 10.0, 5.0]).is_err());
        assert!(Axis::new("lat", vec![0.0, f64::NAN]).is_err());
        assert!(Axis::new("lat", vec![60.0, 0.0, -60.0]).is_ok());
    }

    #[test]
    fn test_regular_latitude_cell_centered() {
        let lat = Axis::regular_latitude(3, NodePlacement::CellCentered).unwrap();
        assert_eq!(lat.values(), &[-60.0, 0.0, 60.0]);
        assert_eq!(lat.detect_latitude_placement(), NodePlacement::CellCentered);
    }

    #[test]
    fn test_regular_latitude_inclusive() {
        let lat = Axis::regular_latitude(5, NodePlacement::Inclusive).unwrap();
        assert_eq!(lat.values(), &[-90.0, -45.0, 0.0, 45.0, 90.0]);
        assert_eq!(lat.detect_latitude_placement(), NodePlacement::Inclusive);
    }

    #[test]
    fn test_regular_longitude() {
        let lon = Axis::regular_longitude(4, 0.0).unwrap();
        assert_eq!(lon.values(), &[0.0, 90.0, 180.0, 270.0]);
        assert_eq!(lon.spacing(), Some(90.0));
        assert!(lon.is_regular(1e-9));
    }

    #[test]
    fn test_bounds_follow_direction() {
        let lat = Axis::new("lat", vec![60.0, 0.0, -60.0]).unwrap();
        assert!(!lat.is_increasing());
        assert_eq!(lat.bounds(180.0), vec![90.0, 30.0, -30.0, -90.0]);

        let lat = Axis::new("lat", vec![-80.0, 0.0, 80.0]).unwrap();
        assert_eq!(lat.latitude_bounds(), vec![-90.0, -40.0, 40.0, 90.0]);
    }

    #[test]
    fn test_longitude_widths() {
        let lon = Axis::regular_longitude(4, 45.0).unwrap();
        assert_eq!(lon.longitude_widths(), vec![90.0; 4]);

        let single = Axis::new("lon", vec![10.0]).unwrap();
        assert_eq!(single.longitude_widths(), vec![360.0]);
    }

    #[test]
    fn test_repeated_seam_has_zero_width() {
        let lon = Axis::new("lon", (0..37).map(|j| -180.0 + 10.0 * j as f64).collect()).unwrap();
        assert!(lon.has_repeated_seam());
        let widths = lon.longitude_widths();
        assert_eq!(widths[36], 0.0);
        assert!((widths.iter().sum::<f64>() - 360.0).abs() < 1e-9);

        assert!(!Axis::regular_longitude(36, 0.0).unwrap().has_repeated_seam());
        let decreasing = Axis::new("lon", vec![360.0, 240.0, 120.0, 0.0]).unwrap();
        assert!(decreasing.has_repeated_seam());
        assert_eq!(decreasing.longitude_widths()[3], 0.0);
    }

    #[test]
    fn test_serde_validates() {
        let axis: Axis = serde_json::from_str("[0.0, 90.0, 180.0]").unwrap();
        assert_eq!(axis.len(), 3);
        assert!(serde_json::from_str::<Axis>("[0.0, 0.0]").is_err());
    }
}
