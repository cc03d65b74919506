//! Error types for gridfeed.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for gridfeed operations.
#[derive(Error, Debug)]
pub enum GridfeedError {
    /// Database connection errors (pool setup, acquire failures, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement preparation and execution errors from the driver.
    #[error("Query error: {0}")]
    Query(String),

    /// Caller-side binding errors (null parameter, unsupported kind).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Result decoding errors (value did not match its declared column type).
    #[error("Decode error: {0}")]
    Decode(String),

    /// SQL script replay errors (unreadable file, broken statement stream).
    #[error("Script error: {0}")]
    Script(String),
}

impl GridfeedError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an invalid-argument error with the given message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a script error with the given message.
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::InvalidArgument(_) => "Invalid Argument",
            Self::Decode(_) => "Decode Error",
            Self::Script(_) => "Script Error",
        }
    }
}

/// Result type alias using GridfeedError.
pub type Result<T> = std::result::Result<T, GridfeedError>;
