//! # Error Types
//!
//! Custom error types for the Crazyflie component using `thiserror`.
//!
//! Connection attempts and precondition violations are not errors at the
//! component surface: they collapse to a `false` result and a log line.
//! These types cover the layers underneath (configuration, driver setup,
//! link I/O).

use thiserror::Error;

/// Main error type for the Crazyflie component
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Link or driver errors reported by the backend
    #[error("Link error: {0}")]
    Link(String),

    /// No driver backend available for this URI scheme
    #[error("Unsupported link URI: {0}")]
    UnsupportedLink(String),

    /// Malformed link address
    #[error("Invalid link address: {0}")]
    InvalidAddress(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the Crazyflie component
pub type Result<T> = std::result::Result<T, ComponentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_error_display() {
        let err = ComponentError::Link("radio dongle not found".to_string());
        assert_eq!(err.to_string(), "Link error: radio dongle not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ComponentError = io.into();
        assert!(matches!(err, ComponentError::Io(_)));
    }
}
