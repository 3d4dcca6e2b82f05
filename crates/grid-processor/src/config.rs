//! Configuration for the tidally-locked transform.

use serde::{Deserialize, Serialize};
use tl_common::{MeanMode, State, TlError, TlResult};

/// Configuration for a transform run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Substellar longitude in degrees.
    pub lon_ss: f64,

    /// Target latitude count; `None` matches the source grid.
    pub nlat: Option<usize>,

    /// Target longitude count; `None` matches the source grid.
    pub nlon: Option<usize>,

    /// Regrid and rotate the wind pair.
    pub do_vel: bool,

    /// Reduction used for global means on the geographic grid.
    pub earth_mean_mode: MeanMode,

    /// Reduction used for global means on the tidally-locked grid, which may
    /// contain no-data cells near its poles.
    pub tl_mean_mode: MeanMode,

    /// Fraction of no-data target cells above which a warning is logged.
    pub nodata_warn_fraction: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            lon_ss: 180.0,
            nlat: None,
            nlon: None,
            do_vel: true,
            earth_mean_mode: MeanMode::Strict,
            tl_mean_mode: MeanMode::NanAware,
            nodata_warn_fraction: 0.1,
        }
    }
}

impl TransformConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TL_LON_SS") {
            if let Ok(lon) = val.parse() {
                config.lon_ss = lon;
            }
        }

        if let Ok(val) = std::env::var("TL_NLAT") {
            if let Ok(n) = val.parse() {
                config.nlat = Some(n);
            }
        }

        if let Ok(val) = std::env::var("TL_NLON") {
            if let Ok(n) = val.parse() {
                config.nlon = Some(n);
            }
        }

        if let Ok(val) = std::env::var("TL_DO_VEL") {
            config.do_vel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("TL_EARTH_MEAN_MODE") {
            config.earth_mean_mode = MeanMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("TL_MEAN_MODE") {
            config.tl_mean_mode = MeanMode::from_str(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> TlResult<()> {
        if !self.lon_ss.is_finite() {
            return Err(TlError::InvalidLongitude(self.lon_ss));
        }

        if self.nlat == Some(0) || self.nlon == Some(0) {
            return Err(TlError::InvalidResolution {
                nlat: self.nlat.unwrap_or(1),
                nlon: self.nlon.unwrap_or(1),
            });
        }

        if !(0.0..=1.0).contains(&self.nodata_warn_fraction) {
            return Err(TlError::InvalidConfig(
                "nodata_warn_fraction must be within 0-1".to_string(),
            ));
        }

        Ok(())
    }

    /// Target resolution, defaulting each dimension to the source grid's.
    ///
    /// Global means are only comparable between frames when resolutions match.
    pub fn resolution_for(&self, source: &State) -> (usize, usize) {
        let (nlat, nlon) = source.shape();
        (self.nlat.unwrap_or(nlat), self.nlon.unwrap_or(nlon))
    }
}
