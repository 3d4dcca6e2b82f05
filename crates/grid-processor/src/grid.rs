//! Construction of the regular target grid in the tidally-locked frame.

use ndarray::Array2;
use projection::SubstellarRotation;
use tl_common::{normalize_longitude, Axis, State, TlError, TlResult, FULL_CIRCLE_DEG};

/// Tolerance (degrees) when comparing source axis spacings.
const SPACING_TOLERANCE: f64 = 1e-6;

/// Build an empty tidally-locked state with `nlat` x `nlon` nodes.
///
/// The grid spans the whole sphere (latitude -90..90, increasing; longitude
/// over 360 degrees) with the same node placement as the source grid, so
/// global means are comparable when the resolutions match. Weights use the
/// same formula as the source state and leading-dimension coordinates
/// (time, levels) are copied over.
pub fn build_target_grid(source: &State, (nlat, nlon): (usize, usize)) -> TlResult<State> {
    if nlat == 0 || nlon == 0 {
        return Err(TlError::InvalidResolution { nlat, nlon });
    }

    let placement = source.lat().detect_latitude_placement();
    let lon_start = longitude_start(source.lon(), nlon);

    let lat = Axis::regular_latitude(nlat, placement)?;
    let lon = Axis::regular_longitude(nlon, lon_start)?;

    tracing::debug!(
        nlat,
        nlon,
        ?placement,
        lon_start,
        "built tidally-locked target grid"
    );

    let mut target = State::new(lat, lon);
    for (name, values) in source.coordinates() {
        target.set_coordinate(name, values.to_vec());
    }
    Ok(target)
}

/// First target longitude: half a target spacing when the source nodes sit
/// at cell centres (e.g. 2.5, 7.5, ...), otherwise 0.
fn longitude_start(source_lon: &Axis, nlon: usize) -> f64 {
    let Some(step) = source_lon.spacing() else {
        return 0.0;
    };
    if !source_lon.is_regular(SPACING_TOLERANCE) {
        return 0.0;
    }
    let offset = (normalize_longitude(source_lon.min()) / step).fract();
    if (offset - 0.5).abs() < SPACING_TOLERANCE {
        0.5 * FULL_CIRCLE_DEG / nlon as f64
    } else {
        0.0
    }
}

/// Geographic position (degrees) of every node of a tidally-locked grid.
///
/// Returns `(lat, lon)`, each shaped `(nlat, nlon)` of the target. These are
/// the points at which source fields are sampled.
pub fn geographic_nodes(target: &State, rotation: &SubstellarRotation) -> (Array2<f64>, Array2<f64>) {
    let (nlat, nlon) = target.shape();
    let mut lat = Array2::zeros((nlat, nlon));
    let mut lon = Array2::zeros((nlat, nlon));

    for (i, lat_tl) in target.lat().values().iter().enumerate() {
        for (j, lon_tl) in target.lon().values().iter().enumerate() {
            let (la, lo) = rotation.to_geographic(lat_tl.to_radians(), lon_tl.to_radians());
            lat[[i, j]] = la.to_degrees();
            lon[[i, j]] = lo.to_degrees();
        }
    }
    (lat, lon)
}
