//! Error types for the flowdash toolkit

use std::{error::Error as StdError, fmt};

/// Main error type for the flowdash toolkit
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Backend returned a non-success HTTP status
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the backend, if any
        message: String,
    },

    /// HTTP transport error (connection, TLS, timeout)
    Http(String),

    /// Authentication error
    Authentication(String),

    /// Not found error
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// CSV export parsing error
    Export(String),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Api { status, message } => {
                write!(f, "API error (status {status}): {message}")
            }
            Self::Http(msg) => write!(f, "HTTP error: {msg}"),
            Self::Authentication(msg) => write!(f, "Authentication failed: {msg}"),
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Export(msg) => write!(f, "Export error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

// From implementations for automatic conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

#[cfg(test)]
#[allow(
    clippy::missing_panics_doc,
    clippy::uninlined_format_args,
    clippy::match_same_arms
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error = Error::from(io_error);

        match app_error {
            Error::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }

        assert!(format!("{}", app_error).contains("I/O error"));
    }

    #[test]
    fn test_configuration_error() {
        let error = Error::Configuration {
            message: "Invalid backend URL".to_string(),
        };

        assert_eq!(
            format!("{}", error),
            "Configuration error: Invalid backend URL"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = Error::Validation {
            field: "client_id".to_string(),
            message: "Field is required".to_string(),
        };

        assert_eq!(
            format!("{}", error),
            "Validation error: client_id - Field is required"
        );
    }

    #[test]
    fn test_api_error() {
        let error = Error::Api {
            status: 404,
            message: "Device not found".to_string(),
        };

        assert_eq!(
            format!("{}", error),
            "API error (status 404): Device not found"
        );
    }

    #[test]
    fn test_http_error() {
        let error = Error::Http("connection refused".to_string());
        assert_eq!(format!("{}", error), "HTTP error: connection refused");
    }

    #[test]
    fn test_authentication_error() {
        let error = Error::Authentication("Invalid token".to_string());
        assert_eq!(format!("{}", error), "Authentication failed: Invalid token");
    }

    #[test]
    fn test_not_found_error() {
        let error = Error::NotFound {
            resource: "drum 42".to_string(),
        };

        assert_eq!(format!("{}", error), "Resource not found: drum 42");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_str = r#"{"invalid": json}"#;
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let app_error = Error::from(json_error);

        match app_error {
            Error::Serialization(_) => {}
            _ => panic!("Expected Serialization error variant"),
        }

        assert!(format!("{}", app_error).contains("Serialization error"));
    }

    #[test]
    fn test_export_error() {
        let error = Error::Export("missing column".to_string());
        assert_eq!(format!("{}", error), "Export error: missing column");
    }

    #[test]
    fn test_other_error() {
        let error = Error::Other("Unexpected error occurred".to_string());
        assert_eq!(format!("{}", error), "Unexpected error occurred");
    }

    #[test]
    fn test_error_chain() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "Access denied");
        let app_error = Error::from(io_error);

        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_error_source_for_plain_variants() {
        let error = Error::Configuration {
            message: "test".to_string(),
        };
        assert!(error.source().is_none());

        let error = Error::Api {
            status: 500,
            message: "test".to_string(),
        };
        assert!(error.source().is_none());

        let error = Error::Http("test".to_string());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<String> {
            Ok("success".to_string())
        }

        fn returns_error() -> Result<String> {
            Err(Error::Other("test error".to_string()))
        }

        assert!(returns_result().is_ok());
        assert!(returns_error().is_err());
    }

    #[test]
    fn test_error_debug_formatting() {
        let error = Error::Api {
            status: 401,
            message: "token expired".to_string(),
        };

        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Api"));
        assert!(debug_str.contains("token expired"));
    }
}
