//! Transform a whole state into the tidally-locked frame.

use ndarray::ArrayD;
use projection::SubstellarRotation;
use tl_common::{State, TlResult};

use crate::config::TransformConfig;
use crate::grid::{build_target_grid, geographic_nodes};
use crate::regrid::Regridder;
use crate::roles::VariableRoles;
use crate::vector::regrid_wind;

/// Regrid the selected variables of `source` onto an `nlat` x `nlon`
/// tidally-locked grid whose pole is the substellar point at `lon_ss`
/// degrees.
///
/// Scalars are interpolated; when `do_vel` is set the wind pair is
/// interpolated and rotated into the new local basis, otherwise it is left
/// out of the result. Target nodes outside the source latitude coverage
/// hold NaN.
///
/// # Errors
/// Configuration errors for unknown variables, mismatched shapes, a zero
/// resolution or a non-finite `lon_ss`.
pub fn transform_state(
    source: &State,
    roles: &VariableRoles,
    resolution: (usize, usize),
    lon_ss: f64,
    do_vel: bool,
) -> TlResult<State> {
    let rotation = SubstellarRotation::new(lon_ss)?;
    roles.validate(source)?;

    let mut target = build_target_grid(source, resolution)?;
    let (geo_lat, geo_lon) = geographic_nodes(&target, &rotation);
    let regridder = Regridder::new(source.lat(), source.lon(), geo_lat.view(), geo_lon.view())?;

    tracing::info!(
        source_shape = ?source.shape(),
        target_shape = ?target.shape(),
        lon_ss = rotation.lon_ss(),
        coverage = regridder.coverage(),
        "transforming state to tidally-locked coordinates"
    );

    for name in roles.scalars() {
        let regridded = regridder.apply(name, source.field(name)?)?;
        log_nodata(name, &regridded);
        target.insert_field(name.as_str(), regridded)?;
    }

    match roles.wind() {
        Some(wind) if do_vel => {
            let (u, v) = regrid_wind(
                source.field(&wind.u)?,
                source.field(&wind.v)?,
                &regridder,
                &rotation,
            )?;
            log_nodata(&wind.u, &u);
            log_nodata(&wind.v, &v);
            target.insert_field(wind.u.as_str(), u)?;
            target.insert_field(wind.v.as_str(), v)?;
        }
        Some(wind) => {
            tracing::info!(u = %wind.u, v = %wind.v, "skipping wind pair (do_vel disabled)");
        }
        None => {}
    }

    Ok(target)
}

/// [`transform_state`] driven by a [`TransformConfig`]; unset resolutions
/// match the source grid.
pub fn transform_with_config(
    source: &State,
    roles: &VariableRoles,
    config: &TransformConfig,
) -> TlResult<State> {
    config.validate()?;
    let target = transform_state(
        source,
        roles,
        config.resolution_for(source),
        config.lon_ss,
        config.do_vel,
    )?;

    for name in target.field_names() {
        let fraction = nodata_fraction(target.field(name)?);
        if fraction > config.nodata_warn_fraction {
            tracing::warn!(
                variable = name,
                fraction,
                "large no-data region in tidally-locked field; use a NaN-aware mean"
            );
        }
    }
    Ok(target)
}

/// Fraction of NaN values in a field.
pub fn nodata_fraction(field: &ArrayD<f64>) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    field.iter().filter(|v| v.is_nan()).count() as f64 / field.len() as f64
}

fn log_nodata(name: &str, field: &ArrayD<f64>) {
    tracing::debug!(
        variable = name,
        shape = ?field.shape(),
        nodata = nodata_fraction(field),
        "regridded variable"
    );
}
