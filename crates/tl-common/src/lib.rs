//! Common types shared by the tidally-locked regridding crates.
//!
//! A [`State`] holds every variable defined on one latitude/longitude grid,
//! together with the solid-angle weights used for global means. Source
//! states come from a data loader (see [`document`]); target states are
//! produced by the transform in `grid-processor`.

pub mod axis;
pub mod document;
pub mod error;
pub mod state;

pub use axis::{Axis, NodePlacement};
pub use document::StateDocument;
pub use error::{TlError, TlResult};
pub use state::{MeanMode, State};

/// Length of a full longitude circle in degrees.
pub const FULL_CIRCLE_DEG: f64 = 360.0;

/// Normalize a longitude in degrees into `[0, 360)`.
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    let lon = lon_deg.rem_euclid(FULL_CIRCLE_DEG);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if lon >= FULL_CIRCLE_DEG {
        0.0
    } else {
        lon
    }
}
