//! Error handling for the reconnaissance engine
//!
//! Provides structured error types with contextual information. Only two
//! classes of error abort a scan: validation failures caught before any I/O
//! begins, and resolution failures for the target itself. Everything that
//! happens on the wire after that point is absorbed into the report as data
//! (an unreachable port or a failed fingerprint signal is a result, not an
//! error).

use std::{io, net::AddrParseError};
use thiserror::Error;

/// Main result type used throughout the application
pub type Result<T> = std::result::Result<T, ScannerError>;

/// Error enum covering the scan-fatal failure scenarios
#[derive(Error, Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum ScannerError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Validation errors for user input (port ranges, timeouts, limits)
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Target name resolution errors - terminal for the whole scan
    #[error("Resolution error: {target} - {reason}")]
    Resolution { target: String, reason: String },

    /// Network connectivity errors outside the absorb-as-data paths
    #[error("Network error: {message}")]
    Network { message: String },

    /// File I/O errors (config file handling, report output)
    #[error("IO error: {operation} - {message}")]
    Io { operation: String, message: String },

    /// Output and serialization errors
    #[error("Output error: {format} - {message}")]
    Output { format: String, message: String },

    /// Generic internal errors with context
    #[error("Internal error: {context} - {message}")]
    Internal { context: String, message: String },
}

impl ScannerError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution<T: Into<String>, R: Into<String>>(target: T, reason: R) -> Self {
        Self::Resolution {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Io {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output<F: Into<String>, M: Into<String>>(format: F, message: M) -> Self {
        Self::Output {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<C: Into<String>, M: Into<String>>(context: C, message: M) -> Self {
        Self::Internal {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Check if error is a configuration issue
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Validation { .. })
    }

    /// Check if error aborts the scan before probing starts
    pub fn is_scan_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Validation { .. } | Self::Resolution { .. }
        )
    }
}

// Implement conversions from common error types
impl From<io::Error> for ScannerError {
    fn from(error: io::Error) -> Self {
        Self::io("IO operation", error.to_string())
    }
}

impl From<AddrParseError> for ScannerError {
    fn from(error: AddrParseError) -> Self {
        Self::validation("ip_address", error.to_string())
    }
}

impl From<serde_json::Error> for ScannerError {
    fn from(error: serde_json::Error) -> Self {
        Self::output("json", error.to_string())
    }
}
