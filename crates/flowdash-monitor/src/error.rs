//! Error types for the polling service

use std::{error::Error as StdError, fmt};

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur while running the polling service
#[derive(Debug)]
pub enum MonitorError {
    /// Error from the backend API client
    Client(flowdash_core::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Service not running
    ServiceNotRunning,

    /// Service already running
    ServiceAlreadyRunning,

    /// Timeout error
    Timeout {
        /// Operation that timed out
        operation: String,
    },

    /// Shutdown error
    Shutdown {
        /// Error message
        message: String,
    },

    /// I/O error
    Io(std::io::Error),
}

impl MonitorError {
    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    #[must_use]
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a new shutdown error
    #[must_use]
    pub fn shutdown<S: Into<String>>(message: S) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(err) => write!(f, "Backend client error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::ServiceNotRunning => write!(f, "Monitor service is not running"),
            Self::ServiceAlreadyRunning => write!(f, "Monitor service is already running"),
            Self::Timeout { operation } => write!(f, "Operation timed out: {operation}"),
            Self::Shutdown { message } => write!(f, "Shutdown error: {message}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl StdError for MonitorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Client(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

// From implementations for automatic conversions
impl From<flowdash_core::Error> for MonitorError {
    fn from(err: flowdash_core::Error) -> Self {
        Self::Client(err)
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
