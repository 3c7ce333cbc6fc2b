//! Error types for bitstring distribution operations.

use thiserror::Error;

/// Failure kinds of the normalization routine.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NormalizationError {
    /// All weights are zero
    #[error("Normalization of BitstringDistribution FAILED: input dict is empty (all zero values)")]
    EmptyDistribution,

    /// Sum too small or too large to invert safely
    #[error("Normalization of BitstringDistribution FAILED: norm {norm:e} cannot be inverted")]
    DegenerateDistribution { norm: f64 },
}

/// Main error type for bitstring distribution operations.
#[derive(Error, Debug)]
pub enum DistributionError {
    /// Mapping is not a bitstring distribution
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Rescaling to unit sum failed
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    /// A serialized artifact is not the expected kind
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Bitstrings of different lengths are not comparable
    #[error("Domain mismatch: target is defined on {target} qubits, measured on {measured}")]
    DomainMismatch { target: usize, measured: usize },

    /// Exactly one of the two distributions is normalized
    #[error("Normalization mismatch: target normalized = {target}, measured normalized = {measured}")]
    NormalizationMismatch { target: bool, measured: bool },

    /// Distance measure name not recognized
    #[error("Bitstring distribution distance measure \"{0}\" not implemented")]
    UnsupportedStrategy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// File access error, passed through unchanged
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for distribution operations.
pub type Result<T> = std::result::Result<T, DistributionError>;

impl From<serde_json::Error> for DistributionError {
    fn from(err: serde_json::Error) -> Self {
        DistributionError::SerializationError(err.to_string())
    }
}

#[cfg(feature = "wasm")]
impl From<DistributionError> for wasm_bindgen::JsValue {
    fn from(err: DistributionError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_error_converts() {
        let err: DistributionError = NormalizationError::EmptyDistribution.into();
        assert!(matches!(
            err,
            DistributionError::Normalization(NormalizationError::EmptyDistribution)
        ));
    }

    #[test]
    fn test_mismatch_messages() {
        let err = DistributionError::DomainMismatch {
            target: 2,
            measured: 3,
        };
        assert!(err.to_string().contains("2 qubits"));

        let err = DistributionError::UnsupportedStrategy("kl".into());
        assert!(err.to_string().contains("\"kl\""));
    }

    #[test]
    fn test_io_error_passes_through() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: DistributionError = io.into();
        match err {
            DistributionError::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }
}
