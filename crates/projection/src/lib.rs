//! Coordinate rotation between the geographic frame and the
//! tidally-locked (TL) frame.
//!
//! The TL frame is the geographic frame rotated so that the substellar
//! point (latitude 0, longitude `lon_ss`) becomes its north pole. The
//! rotation is orthogonal, so angular distances are preserved.

pub mod substellar;
pub mod transform;

pub use substellar::SubstellarRotation;
pub use transform::{tl_coordinates_of_grid, transform_latlon_to_tl, transform_tl_to_latlon};
