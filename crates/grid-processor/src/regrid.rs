//! Bilinear regridding of lat/lon fields onto arbitrary target points.
//!
//! Longitude is periodic: the source longitude axis is extended by one
//! period on each side, so a target near the seam interpolates between the
//! last and first columns. Latitude is not periodic: targets outside the
//! source latitude range get NaN.

use ndarray::{ArrayD, ArrayView2, IxDyn};
use tl_common::{Axis, TlError, TlResult, FULL_CIRCLE_DEG};

/// Neighbouring nodes of one coordinate and the weight of the upper node.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lo: usize,
    hi: usize,
    frac: f64,
}

/// Ascending copy of a latitude axis with the original row of each node.
#[derive(Debug, Clone)]
struct LatitudeIndex {
    values: Vec<f64>,
    rows: Vec<usize>,
}

impl LatitudeIndex {
    fn new(axis: &Axis) -> Self {
        let mut rows: Vec<usize> = (0..axis.len()).collect();
        if !axis.is_increasing() {
            rows.reverse();
        }
        let values = rows.iter().map(|&i| axis.values()[i]).collect();
        Self { values, rows }
    }

    fn locate(&self, lat: f64) -> Option<Bracket> {
        let n = self.values.len();
        if lat.is_nan() || lat < self.values[0] || lat > self.values[n - 1] {
            return None;
        }
        if n == 1 {
            return Some(Bracket {
                lo: self.rows[0],
                hi: self.rows[0],
                frac: 0.0,
            });
        }
        let k = self.values.partition_point(|&v| v <= lat).clamp(1, n - 1);
        let (lo, hi) = (k - 1, k);
        let frac = (lat - self.values[lo]) / (self.values[hi] - self.values[lo]);
        Some(Bracket {
            lo: self.rows[lo],
            hi: self.rows[hi],
            frac,
        })
    }
}

/// Ascending longitude axis padded with one wrapped node on each side.
#[derive(Debug, Clone)]
struct LongitudeIndex {
    extended: Vec<f64>,
    cols: Vec<usize>,
}

impl LongitudeIndex {
    fn new(axis: &Axis) -> TlResult<Self> {
        // A repeated seam node duplicates the first one; the wrap node
        // supplies it.
        let n = if axis.has_repeated_seam() {
            axis.len() - 1
        } else {
            axis.len()
        };
        let mut cols: Vec<usize> = (0..n).collect();
        if !axis.is_increasing() {
            cols.reverse();
        }
        let (lo, hi) = (axis.values()[cols[0]], axis.values()[cols[n - 1]]);
        if hi - lo >= FULL_CIRCLE_DEG {
            return Err(TlError::invalid_axis(
                "lon",
                "longitude axis spans more than a full circle",
            ));
        }

        let first = axis.values()[cols[0]];
        let last = axis.values()[cols[cols.len() - 1]];

        let mut extended = Vec::with_capacity(cols.len() + 2);
        extended.push(last - FULL_CIRCLE_DEG);
        extended.extend(cols.iter().map(|&j| axis.values()[j]));
        extended.push(first + FULL_CIRCLE_DEG);

        let mut padded = Vec::with_capacity(cols.len() + 2);
        padded.push(cols[cols.len() - 1]);
        padded.extend(cols.iter().copied());
        padded.push(cols[0]);

        Ok(Self {
            extended,
            cols: padded,
        })
    }

    fn locate(&self, lon: f64) -> Option<Bracket> {
        if !lon.is_finite() {
            return None;
        }
        let first = self.extended[1];
        let lon = first + (lon - first).rem_euclid(FULL_CIRCLE_DEG);
        let n = self.extended.len();
        let k = self.extended.partition_point(|&v| v <= lon).clamp(1, n - 1);
        let (lo, hi) = (k - 1, k);
        let frac = (lon - self.extended[lo]) / (self.extended[hi] - self.extended[lo]);
        Some(Bracket {
            lo: self.cols[lo],
            hi: self.cols[hi],
            frac,
        })
    }
}

/// Precomputed bilinear stencils from one source grid to a set of target
/// points (given in source-frame degrees).
///
/// Stencils are computed once and reused for every field and every leading
/// slice of a field.
#[derive(Debug, Clone)]
pub struct Regridder {
    src_shape: (usize, usize),
    target_shape: (usize, usize),
    target_lat: Vec<f64>,
    target_lon: Vec<f64>,
    stencils: Vec<Option<(Bracket, Bracket)>>,
}

impl Regridder {
    /// Build stencils for target points `target_lat`/`target_lon` (degrees,
    /// same shape).
    pub fn new(
        src_lat: &Axis,
        src_lon: &Axis,
        target_lat: ArrayView2<'_, f64>,
        target_lon: ArrayView2<'_, f64>,
    ) -> TlResult<Self> {
        if target_lat.shape() != target_lon.shape() {
            return Err(TlError::shape_mismatch(
                "target lon",
                target_lat.shape(),
                target_lon.shape(),
            ));
        }
        let lat_index = LatitudeIndex::new(src_lat);
        let lon_index = LongitudeIndex::new(src_lon)?;

        let target_shape = target_lat.dim();
        let target_lat: Vec<f64> = target_lat.iter().copied().collect();
        let target_lon: Vec<f64> = target_lon.iter().copied().collect();
        let stencils = target_lat
            .iter()
            .zip(&target_lon)
            .map(|(&lat, &lon)| Some((lat_index.locate(lat)?, lon_index.locate(lon)?)))
            .collect();

        Ok(Self {
            src_shape: (src_lat.len(), src_lon.len()),
            target_shape,
            target_lat,
            target_lon,
            stencils,
        })
    }

    /// Shape of the target point array.
    pub fn target_shape(&self) -> (usize, usize) {
        self.target_shape
    }

    /// Target latitudes in source-frame degrees, row-major.
    pub fn target_lat(&self) -> &[f64] {
        &self.target_lat
    }

    /// Target longitudes in source-frame degrees, row-major.
    pub fn target_lon(&self) -> &[f64] {
        &self.target_lon
    }

    /// Fraction of target points inside the source latitude coverage.
    pub fn coverage(&self) -> f64 {
        if self.stencils.is_empty() {
            return 0.0;
        }
        self.stencils.iter().filter(|s| s.is_some()).count() as f64 / self.stencils.len() as f64
    }

    /// Interpolate `field` onto the target points.
    ///
    /// The last two dimensions of `field` must match the source grid; the
    /// result keeps the leading dimensions and replaces the last two with
    /// the target shape.
    pub fn apply(&self, name: &str, field: &ArrayD<f64>) -> TlResult<ArrayD<f64>> {
        let shape = field.shape();
        let ndim = shape.len();
        let (nlat, nlon) = self.src_shape;
        if ndim < 2 || shape[ndim - 2] != nlat || shape[ndim - 1] != nlon {
            let mut expected: Vec<usize> = shape[..ndim.saturating_sub(2)].to_vec();
            expected.extend([nlat, nlon]);
            return Err(TlError::shape_mismatch(name, &expected, shape));
        }

        let lead = &shape[..ndim - 2];
        let count: usize = lead.iter().product();
        let standard = field.as_standard_layout();
        let cube = standard.view().into_shape((count, nlat, nlon))?;

        let mut data = Vec::with_capacity(count * self.stencils.len());
        for slab in cube.outer_iter() {
            data.extend(self.stencils.iter().map(|stencil| match stencil {
                Some((lat, lon)) => bilinear(&slab, lat, lon),
                None => f64::NAN,
            }));
        }

        let mut out_shape = lead.to_vec();
        out_shape.extend([self.target_shape.0, self.target_shape.1]);
        Ok(ArrayD::from_shape_vec(IxDyn(&out_shape), data)?)
    }
}

/// Interpolate one 2-D slab. Corners with zero weight are skipped, so an
/// exact hit on a node ignores its (possibly NaN) neighbours; any NaN among
/// contributing corners propagates.
fn bilinear(slab: &ArrayView2<'_, f64>, lat: &Bracket, lon: &Bracket) -> f64 {
    let corners = [
        (lat.lo, lon.lo, (1.0 - lat.frac) * (1.0 - lon.frac)),
        (lat.lo, lon.hi, (1.0 - lat.frac) * lon.frac),
        (lat.hi, lon.lo, lat.frac * (1.0 - lon.frac)),
        (lat.hi, lon.hi, lat.frac * lon.frac),
    ];
    corners
        .iter()
        .filter(|(_, _, w)| *w != 0.0)
        .map(|&(i, j, w)| w * slab[[i, j]])
        .sum()
}

/// Regrid a single field from a source grid onto target points.
///
/// Convenience wrapper around [`Regridder`] for one-off use.
pub fn regrid(
    field: &ArrayD<f64>,
    src_lat: &Axis,
    src_lon: &Axis,
    target_lat: ArrayView2<'_, f64>,
    target_lon: ArrayView2<'_, f64>,
) -> TlResult<ArrayD<f64>> {
    Regridder::new(src_lat, src_lon, target_lat, target_lon)?.apply("field", field)
}
