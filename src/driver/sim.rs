//! In-process loopback driver for `sim://` links.
//!
//! Behaves like a Crazyflie that is always in range: the link comes up after
//! a fixed delay, setpoints are counted and logged at debug level.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

use super::{FlightDriver, LinkEvent, LinkEvents};
use crate::commander::setpoint::Setpoint;
use crate::error::{ComponentError, Result};
use crate::link::LinkAddress;

#[derive(Debug, Default)]
struct SimLink {
    uri: Option<String>,
    events: Option<LinkEvents>,
    armed: bool,
    setpoints_sent: u64,
    last_setpoint: Option<Setpoint>,
}

/// Simulated Crazyflie link
#[derive(Debug, Clone)]
pub struct SimDriver {
    connect_delay: Duration,
    link: Arc<Mutex<SimLink>>,
}

impl SimDriver {
    pub fn new(connect_delay: Duration) -> Self {
        Self {
            connect_delay,
            link: Arc::new(Mutex::new(SimLink::default())),
        }
    }

    pub fn setpoints_sent(&self) -> u64 {
        self.lock().setpoints_sent
    }

    pub fn last_setpoint(&self) -> Option<Setpoint> {
        self.lock().last_setpoint
    }

    pub fn is_armed(&self) -> bool {
        self.lock().armed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimLink> {
        // A panic while holding the lock leaves plain counters behind, keep going
        self.link.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FlightDriver for SimDriver {
    async fn open_link(&self, address: &LinkAddress, events: LinkEvents) -> Result<()> {
        let uri = address.to_string();
        {
            let mut link = self.lock();
            if link.events.is_some() {
                return Err(ComponentError::Link(format!("link to {} already open", uri)));
            }
            link.uri = Some(uri.clone());
            link.events = Some(events.clone());
        }

        let delay = self.connect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(LinkEvent::Connected { uri });
        });

        debug!("Simulated link opening to {}", address);
        Ok(())
    }

    async fn close_link(&self) -> Result<()> {
        let mut link = self.lock();
        link.armed = false;
        if let (Some(events), Some(uri)) = (link.events.take(), link.uri.take()) {
            let _ = events.send(LinkEvent::Disconnected { uri });
        }
        Ok(())
    }

    async fn send_setpoint(&self, setpoint: Setpoint) -> Result<()> {
        let mut link = self.lock();
        if link.events.is_none() {
            return Err(ComponentError::Link("simulated link is not open".to_string()));
        }
        link.setpoints_sent += 1;
        link.last_setpoint = Some(setpoint);
        debug!(
            "sim setpoint: roll={} pitch={} yaw_rate={} thrust={}",
            setpoint.roll, setpoint.pitch, setpoint.yaw_rate, setpoint.thrust
        );
        Ok(())
    }

    async fn send_arming_request(&self, arm: bool) -> Result<()> {
        self.lock().armed = arm;
        info!("Simulated arming request: {}", if arm { "arm" } else { "disarm" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sim_address() -> LinkAddress {
        LinkAddress::new("sim://loopback").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_connected_after_delay() {
        let driver = SimDriver::new(Duration::from_millis(200));
        let (tx, mut rx) = mpsc::unbounded_channel();

        driver.open_link(&sim_address(), tx).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            LinkEvent::Connected {
                uri: "sim://loopback".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_double_open_rejected() {
        let driver = SimDriver::new(Duration::ZERO);
        let (tx, _rx) = mpsc::unbounded_channel();

        driver.open_link(&sim_address(), tx.clone()).await.unwrap();
        assert!(driver.open_link(&sim_address(), tx).await.is_err());
    }

    #[tokio::test]
    async fn test_close_reports_disconnected_and_disarms() {
        let driver = SimDriver::new(Duration::from_secs(3600));
        let (tx, mut rx) = mpsc::unbounded_channel();

        driver.open_link(&sim_address(), tx).await.unwrap();
        driver.send_arming_request(true).await.unwrap();
        assert!(driver.is_armed());

        driver.close_link().await.unwrap();
        assert!(!driver.is_armed());
        assert_eq!(
            rx.recv().await.unwrap(),
            LinkEvent::Disconnected {
                uri: "sim://loopback".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_setpoints_counted_while_open() {
        let driver = SimDriver::new(Duration::ZERO);

        // Not open yet
        assert!(driver.send_setpoint(Setpoint::ZERO).await.is_err());

        let (tx, _rx) = mpsc::unbounded_channel();
        driver.open_link(&sim_address(), tx).await.unwrap();

        driver.send_setpoint(Setpoint::ZERO).await.unwrap();
        driver.send_setpoint(Setpoint::thrust(20_000)).await.unwrap();

        assert_eq!(driver.setpoints_sent(), 2);
        assert_eq!(driver.last_setpoint(), Some(Setpoint::thrust(20_000)));
    }
}
