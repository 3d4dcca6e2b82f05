//! Which variables to transform, and how.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tl_common::{State, TlError, TlResult};

/// Conventional name of the eastward wind component.
pub const WIND_U: &str = "u";
/// Conventional name of the northward wind component.
pub const WIND_V: &str = "v";

/// Eastward/northward components of one vector field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindPair {
    pub u: String,
    pub v: String,
}

/// The variables of a source state to carry into the tidally-locked frame.
///
/// Scalars are interpolated as-is; the wind pair (if any) is interpolated
/// and then rotated into the new local basis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRoles {
    #[serde(default)]
    scalars: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wind: Option<WindPair>,
}

impl VariableRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar variable.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.scalars.push(name.into());
        self
    }

    /// Set the wind pair.
    pub fn with_wind(mut self, u: impl Into<String>, v: impl Into<String>) -> Self {
        self.wind = Some(WindPair {
            u: u.into(),
            v: v.into(),
        });
        self
    }

    /// Classify a list of variable names: `u` and `v` together form the
    /// wind pair, everything else (including a lone `u` or `v`) is a scalar.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let has_wind = names.iter().any(|n| n == WIND_U) && names.iter().any(|n| n == WIND_V);

        let mut roles = Self::new();
        for name in names {
            if has_wind && (name == WIND_U || name == WIND_V) {
                continue;
            }
            roles = roles.scalar(name);
        }
        if has_wind {
            roles = roles.with_wind(WIND_U, WIND_V);
        }
        roles
    }

    pub fn scalars(&self) -> &[String] {
        &self.scalars
    }

    pub fn wind(&self) -> Option<&WindPair> {
        self.wind.as_ref()
    }

    /// Every variable name referenced, scalars first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scalars
            .iter()
            .map(String::as_str)
            .chain(self.wind.iter().flat_map(|w| [w.u.as_str(), w.v.as_str()]))
    }

    /// Check the roles against a source state: every name must exist and be
    /// used once, and the wind components must share a shape.
    pub fn validate(&self, source: &State) -> TlResult<()> {
        let mut seen = BTreeSet::new();
        for name in self.names() {
            if !seen.insert(name) {
                return Err(TlError::InvalidRoles(format!(
                    "variable '{}' is listed more than once",
                    name
                )));
            }
            if !source.has_field(name) {
                return Err(TlError::UnknownVariable(name.to_string()));
            }
        }

        if let Some(wind) = &self.wind {
            let u = source.field(&wind.u)?;
            let v = source.field(&wind.v)?;
            if u.shape() != v.shape() {
                return Err(TlError::shape_mismatch(&wind.v, u.shape(), v.shape()));
            }
        }
        Ok(())
    }
}
