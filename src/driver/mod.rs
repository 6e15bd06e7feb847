//! # Driver Module
//!
//! Trait abstraction over the Crazyflie driver so the component can be
//! exercised without hardware.
//!
//! The driver reports link changes as [`LinkEvent`] messages on the channel
//! handed to [`FlightDriver::open_link`]. Backends:
//! - `sim://...`: [`sim::SimDriver`], in-process loopback
//! - `radio://...`, `usb://...`: `radio::RadioDriver` (cargo feature `radio`)

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::commander::setpoint::Setpoint;
use crate::config::LinkConfig;
use crate::error::{ComponentError, Result};
use crate::link::LinkAddress;

#[cfg(feature = "radio")]
pub mod radio;
pub mod sim;
#[cfg(feature = "radio")]
pub mod toc_cache;

/// Link events reported by a driver backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The Crazyflie is connected and ready to receive setpoints
    Connected { uri: String },
    /// The link was closed on request
    Disconnected { uri: String },
    /// The link could not be established
    ConnectionFailed { uri: String, msg: String },
    /// An established link went away
    ConnectionLost { uri: String, msg: String },
}

/// Sending half of the link event channel
pub type LinkEvents = mpsc::UnboundedSender<LinkEvent>;

/// Trait for Crazyflie driver operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlightDriver: Send + Sync {
    /// Start opening a link; the outcome is reported on `events`
    ///
    /// An `Err` means the open request itself was rejected and no event
    /// will follow.
    async fn open_link(&self, address: &LinkAddress, events: LinkEvents) -> Result<()>;

    /// Close the current link
    async fn close_link(&self) -> Result<()>;

    /// Send one roll/pitch/yaw-rate/thrust setpoint
    async fn send_setpoint(&self, setpoint: Setpoint) -> Result<()>;

    /// Ask the Crazyflie to arm (`true`) or disarm (`false`) its motors
    async fn send_arming_request(&self, arm: bool) -> Result<()>;
}

/// Initialize the driver backend for `address`
///
/// Called once by the process entry point before any component is built.
///
/// # Errors
///
/// Returns `UnsupportedLink` if no backend handles the URI scheme, or the
/// backend's own error if it fails to initialize.
pub fn init_drivers(config: &LinkConfig, address: &LinkAddress) -> Result<Arc<dyn FlightDriver>> {
    info!("Initializing driver for {} links", address.scheme());

    match address.scheme() {
        "sim" => Ok(Arc::new(sim::SimDriver::new(config.sim_connect_delay()))),
        #[cfg(feature = "radio")]
        "radio" | "usb" => Ok(Arc::new(radio::RadioDriver::new(&config.cache_dir)?)),
        _ => Err(ComponentError::UnsupportedLink(address.to_string())),
    }
}
