//! Error types for option-heatmap.
//!
//! Every fallible operation returns [`Result`]. Domain violations carry the
//! offending field and value so the caller can display or log them as-is.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, HeatmapError>;

/// Errors raised by pricing, surface generation, reconstruction and storage.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// An input invariant is violated (non-positive price/vol/time, inverted
    /// range, resolution below two, ...).
    #[error("invalid {field} = {value}: {reason}")]
    Domain {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The persistence collaborator failed.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reconstruction was requested with zero samples.
    #[error("no surface samples to reconstruct")]
    EmptyData,

    /// A heatmap was requested before any calculation was created.
    #[error("no active calculation: calculate option prices before generating a heatmap")]
    NoActiveCalculation,

    /// Surface generation was cancelled before completion.
    #[error("surface generation cancelled")]
    Cancelled,
}

impl HeatmapError {
    pub fn domain(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::Domain {
            field,
            value,
            reason,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Name of the offending field for domain errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Domain { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        Self::storage_with_source("I/O failure", err)
    }
}

impl From<csv::Error> for HeatmapError {
    fn from(err: csv::Error) -> Self {
        Self::storage_with_source("CSV failure", err)
    }
}
