//! Error types for Mihrab

use thiserror::Error;

/// Errors that can occur in the compute core
#[derive(Debug, Error)]
pub enum MihrabError {
    #[error("Failed to parse orientation event: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid region string: {0}")]
    InvalidRegion(String),

    #[error("Coordinate out of range: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid screen rotation: {0}")]
    InvalidScreenRotation(i32),

    #[error("Location unavailable: {0}")]
    LocationError(String),

    #[error("Bearing service error: {0}")]
    ServiceError(String),

    #[error("Navigation card syntax error: {0}")]
    CardSyntax(String),

    #[error("Unsupported navigation card type: {0}")]
    UnsupportedCard(String),

    #[error("Configuration store error: {0}")]
    ConfigError(String),
}
