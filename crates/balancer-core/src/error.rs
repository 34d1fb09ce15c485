//! Balancer error types.

use thiserror::Error;

/// Errors returned by [`crate::balance`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// Total pan area is not positive, or the dough has no positive first
    /// ingredient.
    #[error("invalid dough weight")]
    InvalidDoughWeight,
}

impl BalanceError {
    /// Business error category reported to metrics.
    pub fn category(&self) -> &'static str {
        match self {
            BalanceError::InvalidDoughWeight => "validation_error",
        }
    }
}

pub type BalanceResult<T> = Result<T, BalanceError>;

/// Errors from computing pan areas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    #[error("invalid measure for {shape} pan: {dimension} must be positive")]
    InvalidMeasure {
        shape: &'static str,
        dimension: &'static str,
    },
}

/// Errors from loading the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
