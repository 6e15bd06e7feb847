//! Link address resolution.
//!
//! A Crazyflie link is identified by a URI such as `radio://0/80/2M/E7E7E7E7E7`
//! (interface / channel / datarate / address). The component treats it as an
//! opaque string; only the scheme is inspected to pick a driver backend.

use std::fmt;

use crate::error::{ComponentError, Result};

/// Environment variable that overrides the configured link URI
pub const URI_ENV_VAR: &str = "CFLIB_URI";

/// Default link URI (radio dongle 0, channel 80, 2Mbit/s, default address)
pub const DEFAULT_URI: &str = "radio://0/80/2M/E7E7E7E7E7";

/// Opaque locator of the radio channel/address of one Crazyflie
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkAddress(String);

impl LinkAddress {
    /// Create a link address from a URI string
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if the URI is blank.
    pub fn new(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(ComponentError::InvalidAddress("empty link URI".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Resolve the link address from `CFLIB_URI`, falling back to `default`
    ///
    /// # Examples
    ///
    /// ```
    /// use crazyflie_component::link::LinkAddress;
    ///
    /// let address = LinkAddress::from_env("radio://0/80/2M/E7E7E7E7E7")?;
    /// assert!(!address.as_str().is_empty());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_env(default: &str) -> Result<Self> {
        Self::resolve(std::env::var(URI_ENV_VAR).ok().as_deref(), default)
    }

    /// Pick `override_uri` when it is set and non-blank, `default` otherwise
    fn resolve(override_uri: Option<&str>, default: &str) -> Result<Self> {
        match override_uri {
            Some(uri) if !uri.trim().is_empty() => Self::new(uri),
            _ => Self::new(default),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI scheme, e.g. `radio` or `sim`. Empty when the URI has no `://`.
    pub fn scheme(&self) -> &str {
        self.0.split_once("://").map_or("", |(scheme, _)| scheme)
    }
}

impl Default for LinkAddress {
    fn default() -> Self {
        Self(DEFAULT_URI.to_string())
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        let address = LinkAddress::default();
        assert_eq!(address.as_str(), "radio://0/80/2M/E7E7E7E7E7");
        assert_eq!(address.scheme(), "radio");
    }

    #[test]
    fn test_blank_address_rejected() {
        assert!(matches!(
            LinkAddress::new("  "),
            Err(ComponentError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_address_is_trimmed() {
        let address = LinkAddress::new(" sim://loopback \n").unwrap();
        assert_eq!(address.as_str(), "sim://loopback");
        assert_eq!(address.scheme(), "sim");
    }

    #[test]
    fn test_scheme_without_separator() {
        let address = LinkAddress::new("E7E7E7E7E7").unwrap();
        assert_eq!(address.scheme(), "");
    }

    #[test]
    fn test_override_wins() {
        let address = LinkAddress::resolve(Some("radio://0/60/2M/E7E7E7E701"), DEFAULT_URI).unwrap();
        assert_eq!(address.as_str(), "radio://0/60/2M/E7E7E7E701");
    }

    #[test]
    fn test_missing_or_blank_override_falls_back() {
        let address = LinkAddress::resolve(None, DEFAULT_URI).unwrap();
        assert_eq!(address, LinkAddress::default());

        let address = LinkAddress::resolve(Some(""), DEFAULT_URI).unwrap();
        assert_eq!(address, LinkAddress::default());
    }

    #[test]
    fn test_display_matches_uri() {
        let address = LinkAddress::new("usb://0").unwrap();
        assert_eq!(format!("{}", address), "usb://0");
    }
}
