//! # Crazyflie Component
//!
//! Wraps one Crazyflie as a launcher-managed component:
//! - `activate` connects to the configured link address
//! - `tick` runs the motor ramp demonstration
//! - `shutdown` closes the link
//!
//! Arming, disarming and raw setpoints are exposed for external callers and
//! are all skipped with a warning while the link is down.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{Component, ComponentStatus};
use crate::commander::{DemoSequencer, RampProfile, Setpoint, SetpointForwarder};
use crate::config::Config;
use crate::driver::FlightDriver;
use crate::link::{ConnectionSupervisor, LinkAddress, SupervisorSettings};

pub struct CrazyflieComponent {
    name: String,
    address: LinkAddress,
    supervisor: ConnectionSupervisor,
    forwarder: SetpointForwarder,
    sequencer: DemoSequencer,
}

impl CrazyflieComponent {
    pub fn new(
        name: impl Into<String>,
        address: LinkAddress,
        driver: Arc<dyn FlightDriver>,
        settings: SupervisorSettings,
        profile: RampProfile,
    ) -> Self {
        let supervisor = ConnectionSupervisor::new(driver, settings);
        let forwarder = SetpointForwarder::new(supervisor.driver(), supervisor.state());
        let sequencer = DemoSequencer::new(forwarder.clone(), profile);

        Self {
            name: name.into(),
            address,
            supervisor,
            forwarder,
            sequencer,
        }
    }

    /// Build the component from the `[component]`, `[link]` and `[demo]` sections
    pub fn from_config(config: &Config, address: LinkAddress, driver: Arc<dyn FlightDriver>) -> Self {
        Self::new(
            config.component.name.clone(),
            address,
            driver,
            SupervisorSettings::from(&config.link),
            RampProfile::from(&config.demo),
        )
    }

    pub fn address(&self) -> &LinkAddress {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    /// Connect to the Crazyflie, see [`ConnectionSupervisor::connect`]
    pub async fn connect(&self) -> bool {
        self.supervisor.connect(&self.address).await
    }

    /// Close the link and clear the connection state
    pub async fn disconnect(&self) -> bool {
        self.supervisor.disconnect().await
    }

    /// Arm the Crazyflie
    pub async fn arm(&self) -> bool {
        self.request_arming(true).await
    }

    /// Disarm the Crazyflie
    pub async fn disarm(&self) -> bool {
        self.request_arming(false).await
    }

    /// Send one setpoint, see [`SetpointForwarder::send_setpoint`]
    pub async fn send_setpoint(&self, setpoint: Setpoint) -> bool {
        self.forwarder.send_setpoint(setpoint).await
    }

    /// Run the motor ramp demonstration, see [`DemoSequencer::ramp_motors`]
    pub async fn ramp_motors(&self) -> bool {
        self.sequencer.ramp_motors().await
    }

    async fn request_arming(&self, arm: bool) -> bool {
        let action = if arm { "arm" } else { "disarm" };
        if !self.supervisor.is_connected() {
            warn!("Cannot {}: Not connected to Crazyflie", action);
            return false;
        }

        match self.supervisor.driver().send_arming_request(arm).await {
            Ok(()) => {
                info!("Crazyflie {}ed", action);
                true
            }
            Err(e) => {
                warn!("Failed to {} Crazyflie: {}", action, e);
                false
            }
        }
    }
}

#[async_trait]
impl Component for CrazyflieComponent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn activate(&mut self) {
        if !self.connect().await {
            error!("{}: could not connect to Crazyflie at {}", self.name, self.address);
        }
    }

    async fn tick(&mut self) {
        self.ramp_motors().await;
    }

    async fn shutdown(&mut self) {
        self.disconnect().await;
    }

    fn status(&self) -> ComponentStatus {
        ComponentStatus {
            name: self.name.clone(),
            address: self.address.to_string(),
            connected: self.is_connected(),
            timestamp: Utc::now(),
        }
    }
}

impl Drop for CrazyflieComponent {
    fn drop(&mut self) {
        if !self.supervisor.is_connected() {
            return;
        }

        // Best effort: closing is async, it needs a live runtime
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let driver = self.supervisor.driver();
                handle.spawn(async move {
                    if let Err(e) = driver.close_link().await {
                        warn!("Error while closing link on drop: {}", e);
                    }
                });
                info!("{}: closing link to {} on drop", self.name, self.address);
            }
            Err(_) => warn!("{}: dropped while connected, link left open", self.name),
        }
    }
}
