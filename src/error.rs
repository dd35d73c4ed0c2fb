//! Error types for the analysis core.
//!
//! Record-level errors ([`InvalidCoordinate`](AnalysisError::InvalidCoordinate),
//! [`MissingPrice`](AnalysisError::MissingPrice)) are recovered by skipping the
//! offending record and bumping a diagnostic counter. Configuration errors are
//! fatal and surface before any analysis begins.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Latitude outside −90..90 or longitude outside −180..180.
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Malformed distance-band boundaries.
    #[error("invalid band configuration: {0}")]
    InvalidConfiguration(String),

    /// Record has no price and cannot contribute to any band.
    #[error("record has no price")]
    MissingPrice,
}
