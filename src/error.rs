//! Error types for grad-portal.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for grad-portal operations.
#[derive(Error, Debug)]
pub enum PortalError {
    /// A required form field was not submitted.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A submitted form field could not be parsed as its declared kind.
    #[error("Invalid value {value:?} for field {field}")]
    InvalidField { field: String, value: String },

    /// Database connection errors (host unreachable, auth failed, timeout, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, constraint violations, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Creates a missing-field error for the given field name.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates an invalid-field error for the given field and submitted value.
    pub fn invalid_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for errors raised while checking the submitted form.
    ///
    /// These are always produced before any database connection is opened.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidField { .. })
    }

    /// Returns true for errors reported by the database backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Query(_))
    }

    /// Returns the backend's detail text without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::Connection(msg)
            | Self::Query(msg)
            | Self::Config(msg)
            | Self::Internal(msg)
            | Self::MissingField(msg) => msg.clone(),
            Self::InvalidField { field, value } => format!("{field} = {value:?}"),
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "Missing Field",
            Self::InvalidField { .. } => "Invalid Field",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using PortalError.
pub type Result<T> = std::result::Result<T, PortalError>;
