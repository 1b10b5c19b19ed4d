//! Error types for the Entitlement Engine.
//!
//! The calculation itself never fails: configuration gaps, cyclic carry-over
//! and invalid trip ranges degrade to zero and are reported as audit warnings.
//! The errors in this module belong to the outer surfaces, namely workspace
//! loading and request handling.

use thiserror::Error;

/// The main error type for the Entitlement Engine.
///
/// # Example
///
/// ```
/// use entitlement_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/workspace.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/workspace.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is internally inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// A category id was not found in the workspace.
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// The category id that was not found.
        id: String,
    },

    /// A request was invalid or contained inconsistent data.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
