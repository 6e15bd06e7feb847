//! # Connection Supervisor
//!
//! Opens the link to one Crazyflie and keeps [`ConnectionState`] in sync with
//! the driver's link events.
//!
//! ## State Machine
//!
//! ```text
//! Disconnected --connect()--> Connecting --Connected--> Connected
//!      ^                          |                         |
//!      +------ timeout / open error                         |
//!      +------------------ ConnectionLost / Disconnected ---+
//! ```
//!
//! `ConnectionFailed` is logged and leaves the state alone; `connect()` then
//! returns `false` once its timeout expires.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use super::address::LinkAddress;
use super::state::{ConnectionState, StateCell};
use crate::config::LinkConfig;
use crate::driver::{FlightDriver, LinkEvent};

/// Timing of a connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// How long `connect()` waits for the Connected event
    pub connect_timeout: Duration,
    /// Pause after the arming request sent on connection
    pub arm_grace: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self::from(&LinkConfig::default())
    }
}

impl From<&LinkConfig> for SupervisorSettings {
    fn from(config: &LinkConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            arm_grace: config.arm_grace(),
        }
    }
}

/// Opens the link and tracks its state
pub struct ConnectionSupervisor {
    driver: Arc<dyn FlightDriver>,
    state: Arc<StateCell>,
    settings: SupervisorSettings,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionSupervisor {
    pub fn new(driver: Arc<dyn FlightDriver>, settings: SupervisorSettings) -> Self {
        Self {
            driver,
            state: Arc::new(StateCell::new()),
            settings,
            event_task: Mutex::new(None),
        }
    }

    /// Shared handle on the connection state
    pub fn state(&self) -> Arc<StateCell> {
        self.state.clone()
    }

    pub fn driver(&self) -> Arc<dyn FlightDriver> {
        self.driver.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Connect to the Crazyflie at `address`
    ///
    /// Opens the link and waits up to the connect timeout for the Connected
    /// event. Failures are logged and reported as `false`; a failed attempt
    /// is not retried. Returns `true` straight away if already connected.
    ///
    /// # Returns
    ///
    /// * `true` if the link is already up or came up within the timeout
    /// * `false` if opening failed or the timeout expired
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use crazyflie_component::driver::sim::SimDriver;
    /// use crazyflie_component::link::{ConnectionSupervisor, LinkAddress, SupervisorSettings};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let driver = Arc::new(SimDriver::new(Duration::from_millis(200)));
    ///     let supervisor = ConnectionSupervisor::new(driver, SupervisorSettings::default());
    ///
    ///     let address = LinkAddress::new("sim://loopback")?;
    ///     assert!(supervisor.connect(&address).await);
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(&self, address: &LinkAddress) -> bool {
        if self.state.is_connected() {
            info!("Already connected to Crazyflie at {}", address);
            return true;
        }

        info!("Connecting to Crazyflie at {}", address);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut state_rx = self.state.subscribe();
        self.state.set(ConnectionState::Connecting);

        if let Err(e) = self.driver.open_link(address, events_tx).await {
            error!("Failed to connect to Crazyflie at {}: {}", address, e);
            self.state.transition(ConnectionState::Connecting, ConnectionState::Disconnected);
            return false;
        }

        // Events sent by the driver so far are buffered in the channel
        self.spawn_event_handler(events_rx);

        let outcome = timeout(
            self.settings.connect_timeout,
            state_rx.wait_for(|state| state.is_connected()),
        )
        .await
        .map(|changed| changed.is_ok());

        match outcome {
            Ok(true) => true,
            Ok(false) => {
                self.state.transition(ConnectionState::Connecting, ConnectionState::Disconnected);
                false
            }
            Err(_) => {
                warn!(
                    "Timed out after {:?} waiting for Crazyflie at {}",
                    self.settings.connect_timeout, address
                );
                self.state.transition(ConnectionState::Connecting, ConnectionState::Disconnected);
                false
            }
        }
    }

    /// Close the link if it is connected
    ///
    /// # Returns
    ///
    /// * `true` if a connected link was closed
    pub async fn disconnect(&self) -> bool {
        if !self.state.is_connected() {
            return false;
        }

        if let Err(e) = self.driver.close_link().await {
            warn!("Error while closing link: {}", e);
        }
        self.state.set(ConnectionState::Disconnected);
        info!("Disconnected from Crazyflie");
        true
    }

    /// Start consuming link events, replacing the handler of a previous attempt
    fn spawn_event_handler(&self, mut events: mpsc::UnboundedReceiver<LinkEvent>) {
        let driver = self.driver.clone();
        let state = self.state.clone();
        let arm_grace = self.settings.arm_grace;

        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                handle_event(driver.as_ref(), &state, arm_grace, event).await;
            }
        });

        let mut slot = self.event_task.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        let slot = self.event_task.get_mut().unwrap_or_else(|p| p.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
        }
        self.state.set(ConnectionState::Disconnected);
    }
}

async fn handle_event(
    driver: &dyn FlightDriver,
    state: &StateCell,
    arm_grace: Duration,
    event: LinkEvent,
) {
    match event {
        LinkEvent::Connected { uri } => {
            info!("Successfully connected to Crazyflie at {}", uri);
            state.set(ConnectionState::Connected);

            // Give the Crazyflie time to accept arming before setpoints arrive
            if let Err(e) = driver.send_arming_request(true).await {
                warn!("Arming request after connection failed: {}", e);
            }
            sleep(arm_grace).await;
        }
        LinkEvent::ConnectionFailed { uri, msg } => {
            error!("Connection to {} failed: {}", uri, msg);
        }
        LinkEvent::ConnectionLost { uri, msg } => {
            warn!("Connection to {} lost: {}", uri, msg);
            state.set(ConnectionState::Disconnected);
        }
        LinkEvent::Disconnected { uri } => {
            info!("Disconnected from {}", uri);
            state.set(ConnectionState::Disconnected);
        }
    }
}
