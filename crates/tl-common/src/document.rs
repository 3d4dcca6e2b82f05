//! JSON representation of a [`State`] for exchange with data loaders.
//!
//! Fields are stored row-major as `{ "shape": [...], "data": [...] }`.
//! JSON has no NaN, so no-data cells are written as `null` and read back
//! as NaN.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::error::{TlError, TlResult};
use crate::state::State;

/// One n-dimensional field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDocument {
    pub shape: Vec<usize>,
    pub data: Vec<Option<f64>>,
}

impl FieldDocument {
    pub fn from_array(array: &ArrayD<f64>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            data: array
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect(),
        }
    }

    pub fn into_array(self, name: &str) -> TlResult<ArrayD<f64>> {
        let expected: usize = self.shape.iter().product();
        if expected != self.data.len() {
            return Err(TlError::Document(format!(
                "field '{}' has shape {:?} but {} values",
                name,
                self.shape,
                self.data.len()
            )));
        }
        let values = self.data.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Ok(ArrayD::from_shape_vec(IxDyn(&self.shape), values)?)
    }
}

/// Where a document came from, recorded when a transform produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub generated_at: DateTime<Utc>,
    /// Substellar longitude (degrees) used for the tidally-locked frame.
    pub lon_ss: f64,
}

/// Serializable form of a [`State`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDocument {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    #[serde(default)]
    pub coords: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDocument>,
    /// Written for consumers; ignored on load since weights are derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<FieldDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl StateDocument {
    pub fn from_state(state: &State) -> Self {
        Self {
            lat: state.lat().values().to_vec(),
            lon: state.lon().values().to_vec(),
            coords: state
                .coordinates()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
            fields: state
                .fields()
                .map(|(k, v)| (k.to_string(), FieldDocument::from_array(v)))
                .collect(),
            weights: Some(FieldDocument::from_array(&state.weights().clone().into_dyn())),
            provenance: None,
        }
    }

    /// Record that this document holds a tidally-locked state.
    pub fn with_provenance(mut self, lon_ss: f64) -> Self {
        self.provenance = Some(Provenance {
            generated_at: Utc::now(),
            lon_ss,
        });
        self
    }

    /// Build a validated [`State`]; axes and field shapes are checked.
    pub fn into_state(self) -> TlResult<State> {
        let lat = Axis::new("lat", self.lat)?;
        let lon = Axis::new("lon", self.lon)?;
        let mut state = State::new(lat, lon);
        for (name, values) in self.coords {
            state.set_coordinate(name, values);
        }
        for (name, field) in self.fields {
            let array = field.into_array(&name)?;
            state.insert_field(name, array)?;
        }
        Ok(state)
    }

    pub fn from_json_str(json: &str) -> TlResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> TlResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn read(path: impl AsRef<Path>) -> TlResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = json.len(), "read state document");
        Self::from_json_str(&json)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> TlResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?)?;
        tracing::debug!(path = %path.display(), "wrote state document");
        Ok(())
    }
}
