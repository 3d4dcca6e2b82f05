//! Error types for tidally-locked regridding.

use thiserror::Error;

/// Result type alias using TlError.
pub type TlResult<T> = Result<T, TlError>;

/// Primary error type for grid construction, transforms and state documents.
///
/// Points outside the source grid's latitude coverage are not errors; they
/// are reported as NaN in the regridded fields.
#[derive(Debug, Error)]
pub enum TlError {
    // === Configuration Errors ===
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Shape mismatch for '{name}': expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Invalid target resolution {nlat}x{nlon}: both dimensions must be > 0")]
    InvalidResolution { nlat: usize, nlon: usize },

    #[error("Invalid axis '{name}': {reason}")]
    InvalidAxis { name: String, reason: String },

    #[error("Invalid substellar longitude: {0}")]
    InvalidLongitude(f64),

    #[error("Invalid variable roles: {0}")]
    InvalidRoles(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Document Errors ===
    #[error("Invalid state document: {0}")]
    Document(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl TlError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(name: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Create an InvalidAxis error.
    pub fn invalid_axis(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAxis {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by the caller's configuration
    /// (unknown names, bad shapes, bad resolution) rather than I/O.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, TlError::Document(_) | TlError::Io(_))
    }
}

impl From<std::io::Error> for TlError {
    fn from(err: std::io::Error) -> Self {
        TlError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TlError {
    fn from(err: serde_json::Error) -> Self {
        TlError::Document(format!("JSON error: {}", err))
    }
}

impl From<ndarray::ShapeError> for TlError {
    fn from(err: ndarray::ShapeError) -> Self {
        TlError::InvalidConfig(format!("array layout: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(TlError::UnknownVariable("tsurf".into()).is_configuration_error());
        assert!(TlError::InvalidResolution { nlat: 0, nlon: 4 }.is_configuration_error());
        assert!(TlError::shape_mismatch("u", &[3, 4], &[4, 3]).is_configuration_error());
        assert!(!TlError::Document("bad".into()).is_configuration_error());
        assert!(!TlError::Io("missing".into()).is_configuration_error());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = TlError::shape_mismatch("tsurf", &[3, 4], &[3, 5]);
        assert_eq!(
            err.to_string(),
            "Shape mismatch for 'tsurf': expected [3, 4], found [3, 5]"
        );
    }
}
