//! The grid state container: every variable defined on one lat/lon grid.

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayD, ArrayView2, Axis as ArrayAxis, IxDyn, Slice};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::error::{TlError, TlResult};

/// Name of the time coordinate.
pub const TIME_COORD: &str = "t";

/// How NaN (no-data) cells are treated when computing area-weighted means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanMode {
    /// Plain weighted sum; any NaN cell makes the mean NaN.
    #[default]
    Strict,
    /// Skip NaN cells and renormalize the weights over the valid ones.
    NanAware,
}

impl MeanMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nan_aware" | "nanaware" | "nan" => Self::NanAware,
            _ => Self::Strict,
        }
    }
}

impl std::fmt::Display for MeanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::NanAware => write!(f, "nan_aware"),
        }
    }
}

/// All variables on a single latitude/longitude grid.
///
/// Every field has rank >= 2 and its last two dimensions are
/// `(lat.len(), lon.len())`; this is checked on insertion. Leading
/// dimensions are described, when known, by named coordinates such as
/// `t` (time) or `alt`.
#[derive(Debug, Clone)]
pub struct State {
    lat: Axis,
    lon: Axis,
    coords: BTreeMap<String, Vec<f64>>,
    fields: BTreeMap<String, ArrayD<f64>>,
    weights: Array2<f64>,
}

impl State {
    /// Create an empty state on the given grid. Weights are derived from the axes.
    pub fn new(lat: Axis, lon: Axis) -> Self {
        let weights = solid_angle_weights(&lat, &lon);
        Self {
            lat,
            lon,
            coords: BTreeMap::new(),
            fields: BTreeMap::new(),
            weights,
        }
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    /// Grid shape as `(nlat, nlon)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Per-cell solid-angle weights, shape `(nlat, nlon)`, summing to 1.
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Weights summed over longitude: one weight per latitude row.
    pub fn latitude_weights(&self) -> Vec<f64> {
        self.weights.sum_axis(ArrayAxis(1)).to_vec()
    }

    /// Attach a coordinate for a leading dimension (time, level, ...).
    pub fn set_coordinate(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.coords.insert(name.into(), values);
    }

    pub fn coordinate(&self, name: &str) -> Option<&[f64]> {
        self.coords.get(name).map(Vec::as_slice)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The time coordinate `t`, if present.
    pub fn time(&self) -> Option<&[f64]> {
        self.coordinate(TIME_COORD)
    }

    /// Insert or overwrite a field, checking its trailing dimensions.
    pub fn insert_field(&mut self, name: impl Into<String>, field: ArrayD<f64>) -> TlResult<()> {
        let name = name.into();
        self.check_field_shape(&name, field.shape())?;
        self.fields.insert(name, field);
        Ok(())
    }

    /// Check that a field of the given shape can live on this grid.
    pub fn check_field_shape(&self, name: &str, shape: &[usize]) -> TlResult<()> {
        let (nlat, nlon) = self.shape();
        let ndim = shape.len();
        if ndim < 2 || shape[ndim - 2] != nlat || shape[ndim - 1] != nlon {
            let mut expected: Vec<usize> = shape[..ndim.saturating_sub(2)].to_vec();
            expected.extend([nlat, nlon]);
            return Err(TlError::shape_mismatch(name, &expected, shape));
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> TlResult<&ArrayD<f64>> {
        self.fields
            .get(name)
            .ok_or_else(|| TlError::UnknownVariable(name.to_string()))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ArrayD<f64>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Area-weighted global mean of a field over its last two axes.
    ///
    /// The result has the field's leading dimensions (a 0-d array for a
    /// plain 2-D field).
    pub fn global_mean(&self, name: &str, mode: MeanMode) -> TlResult<ArrayD<f64>> {
        let field = self.field(name)?;
        let ndim = field.ndim();
        let lead: Vec<usize> = field.shape()[..ndim - 2].to_vec();
        let (nlat, nlon) = self.shape();
        let count: usize = lead.iter().product();

        let standard = field.as_standard_layout();
        let cube = standard.view().into_shape((count, nlat, nlon))?;
        let means: Vec<f64> = cube
            .outer_iter()
            .map(|slab| weighted_mean(slab, self.weights.view(), mode))
            .collect();

        Ok(ArrayD::from_shape_vec(IxDyn(&lead), means)?)
    }

    /// Average every time-dependent field over its last `last` time steps.
    ///
    /// A field is time-dependent when its first dimension has the length of
    /// the `t` coordinate; averaging removes that dimension. Uses a plain
    /// mean, so NaN propagates. Returns the names of the averaged fields.
    pub fn average_time(&mut self, last: usize) -> TlResult<Vec<String>> {
        if last == 0 {
            return Err(TlError::InvalidConfig(
                "time average needs at least one step".to_string(),
            ));
        }
        let Some(nt) = self.time().map(<[f64]>::len) else {
            return Ok(Vec::new());
        };

        let mut averaged = Vec::new();
        for (name, field) in self.fields.iter_mut() {
            if field.ndim() < 3 || field.shape()[0] != nt {
                continue;
            }
            let start = nt.saturating_sub(last);
            let mean = field
                .slice_axis(ArrayAxis(0), Slice::from(start..))
                .mean_axis(ArrayAxis(0))
                .ok_or_else(|| TlError::InvalidConfig(format!("'{}' has no time steps", name)))?;
            *field = mean;
            averaged.push(name.clone());
        }

        tracing::debug!(steps = last, fields = ?averaged, "averaged fields over time");
        Ok(averaged)
    }

    /// Drop length-1 leading dimensions from every field. The lat/lon
    /// dimensions are always kept.
    pub fn squeeze_fields(&mut self) {
        for field in self.fields.values_mut() {
            let mut squeezed = field.clone();
            for ax in (0..squeezed.ndim().saturating_sub(2)).rev() {
                if squeezed.shape()[ax] == 1 {
                    squeezed = squeezed.index_axis_move(ArrayAxis(ax), 0);
                }
            }
            *field = squeezed;
        }
    }
}

/// Normalized solid-angle weight of every grid cell.
///
/// A cell's weight is `(sin(lat_hi) - sin(lat_lo)) * lon_width`, with
/// latitude bounds clamped to the poles; on a regular cell-centered grid this
/// is proportional to `cos(lat)`. Weights sum to 1.
pub fn solid_angle_weights(lat: &Axis, lon: &Axis) -> Array2<f64> {
    let lat_bounds = lat.latitude_bounds();
    let band: Vec<f64> = lat_bounds
        .windows(2)
        .map(|w| (w[1].to_radians().sin() - w[0].to_radians().sin()).abs())
        .collect();
    let widths = lon.longitude_widths();

    let mut weights = Array2::from_shape_fn((lat.len(), lon.len()), |(i, j)| band[i] * widths[j]);
    let total = weights.sum();
    if total > 0.0 {
        weights /= total;
    }
    weights
}

/// Weighted mean of one 2-D slab.
pub fn weighted_mean(values: ArrayView2<f64>, weights: ArrayView2<f64>, mode: MeanMode) -> f64 {
    match mode {
        MeanMode::Strict => {
            let total: f64 = weights.sum();
            values
                .iter()
                .zip(weights.iter())
                .map(|(v, w)| v * w)
                .sum::<f64>()
                / total
        }
        MeanMode::NanAware => {
            let (sum, norm) = values
                .iter()
                .zip(weights.iter())
                .filter(|(v, _)| !v.is_nan())
                .fold((0.0, 0.0), |(s, n), (v, w)| (s + v * w, n + w));
            if norm > 0.0 {
                sum / norm
            } else {
                f64::NAN
            }
        }
    }
}
