//! Regridding of geographic lat/lon states onto tidally-locked grids.
//!
//! The tidally-locked (TL) frame puts its north pole at the substellar
//! point and its south pole at the antistellar point. A transform:
//!
//! ```text
//! source State ──► build_target_grid(nlat, nlon)
//!      │                    │
//!      │                    ▼
//!      │          geographic_nodes (TL node -> lat/lon)
//!      │                    │
//!      └──────► Regridder (bilinear, built once)
//!                           │
//!              ┌────────────┴────────────┐
//!              ▼                         ▼
//!          scalars              wind pair: interpolate,
//!                               then rotate into TL basis
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{transform_state, VariableRoles};
//!
//! let roles = VariableRoles::from_names(["tsurf", "u", "v"]);
//! let tl = transform_state(&earth, &roles, (32, 64), 180.0, true)?;
//! let mean = tl.global_mean("tsurf", MeanMode::NanAware)?;
//! ```

pub mod config;
pub mod diagnostics;
pub mod grid;
pub mod regrid;
pub mod roles;
pub mod transform;
pub mod vector;

// Re-export commonly used types at crate root
pub use config::TransformConfig;
pub use diagnostics::{compare_global_means, MeanComparison};
pub use grid::{build_target_grid, geographic_nodes};
pub use regrid::{regrid, Regridder};
pub use roles::{VariableRoles, WindPair, WIND_U, WIND_V};
pub use transform::{nodata_fraction, transform_state, transform_with_config};
pub use vector::{regrid_vector, regrid_wind};
