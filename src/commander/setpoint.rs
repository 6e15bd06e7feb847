//! # Setpoint Forwarding
//!
//! A setpoint is the legacy RPYT command understood by the Crazyflie
//! commander: roll and pitch angles in degrees, yaw rate in degrees/second
//! and a 16-bit thrust (0 = 0%, 65535 = 100%).
//!
//! Thrust is locked by the firmware after connection; one setpoint with
//! `thrust = 0` ([`Setpoint::ZERO`]) must be sent before any non-zero thrust
//! takes effect.

use std::sync::Arc;
use tracing::warn;

use crate::driver::FlightDriver;
use crate::link::StateCell;

/// Roll / pitch / yaw-rate / thrust flight command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    /// Roll angle (degrees)
    pub roll: f32,
    /// Pitch angle (degrees)
    pub pitch: f32,
    /// Yaw rate (degrees/second)
    pub yaw_rate: f32,
    /// Thrust (0..=65535)
    pub thrust: u16,
}

impl Setpoint {
    /// All-zero setpoint, unlocks thrust protection and cuts the motors
    pub const ZERO: Setpoint = Setpoint {
        roll: 0.0,
        pitch: 0.0,
        yaw_rate: 0.0,
        thrust: 0,
    };

    pub fn new(roll: f32, pitch: f32, yaw_rate: f32, thrust: u16) -> Self {
        Self {
            roll,
            pitch,
            yaw_rate,
            thrust,
        }
    }

    /// Level attitude with the given thrust
    pub fn thrust(thrust: u16) -> Self {
        Self {
            thrust,
            ..Self::ZERO
        }
    }
}

/// Relays setpoints to the driver while the link is connected
///
/// Cheap to clone; clones share the driver and the connection state.
#[derive(Clone)]
pub struct SetpointForwarder {
    driver: Arc<dyn FlightDriver>,
    state: Arc<StateCell>,
}

impl SetpointForwarder {
    pub fn new(driver: Arc<dyn FlightDriver>, state: Arc<StateCell>) -> Self {
        Self { driver, state }
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Send a setpoint to the Crazyflie
    ///
    /// # Returns
    ///
    /// * `true` if the setpoint was handed to the driver
    /// * `false` if the link is not connected (nothing is sent) or the
    ///   driver rejected it; both cases are logged, never raised
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn hover(forwarder: crazyflie_component::commander::SetpointForwarder) {
    /// use crazyflie_component::commander::Setpoint;
    ///
    /// forwarder.send_setpoint(Setpoint::ZERO).await;
    /// forwarder.send_setpoint(Setpoint::new(0.0, 0.0, 0.0, 20_000)).await;
    /// # }
    /// ```
    pub async fn send_setpoint(&self, setpoint: Setpoint) -> bool {
        if !self.state.is_connected() {
            warn!("Cannot send setpoint: Not connected to Crazyflie");
            return false;
        }

        match self.driver.send_setpoint(setpoint).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send setpoint: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mocks::RecordingDriver;
    use crate::driver::MockFlightDriver;
    use crate::error::ComponentError;
    use crate::link::ConnectionState;

    #[test]
    fn test_zero_setpoint() {
        assert_eq!(Setpoint::ZERO, Setpoint::new(0.0, 0.0, 0.0, 0));
        assert_eq!(Setpoint::thrust(0), Setpoint::ZERO);
    }

    #[test]
    fn test_thrust_setpoint_is_level() {
        let sp = Setpoint::thrust(u16::MAX);
        assert_eq!(sp.roll, 0.0);
        assert_eq!(sp.pitch, 0.0);
        assert_eq!(sp.yaw_rate, 0.0);
        assert_eq!(sp.thrust, 65535);
    }

    #[tokio::test]
    async fn test_driver_never_called_while_disconnected() {
        let mut driver = MockFlightDriver::new();
        driver.expect_send_setpoint().never();

        let state = Arc::new(StateCell::new());
        let forwarder = SetpointForwarder::new(Arc::new(driver), state.clone());

        assert!(!forwarder.send_setpoint(Setpoint::thrust(20_000)).await);

        // Still connecting is not connected
        state.set(ConnectionState::Connecting);
        assert!(!forwarder.send_setpoint(Setpoint::ZERO).await);
    }

    #[tokio::test]
    async fn test_forwards_while_connected() {
        let driver = RecordingDriver::new();
        let state = Arc::new(StateCell::new());
        state.set(ConnectionState::Connected);

        let forwarder = SetpointForwarder::new(Arc::new(driver.clone()), state);
        let sp = Setpoint::new(1.5, -2.0, 30.0, 42_000);

        assert!(forwarder.send_setpoint(sp).await);
        assert_eq!(driver.get_setpoints(), vec![sp]);
    }

    #[tokio::test]
    async fn test_driver_error_is_reported_not_raised() {
        let mut driver = MockFlightDriver::new();
        driver
            .expect_send_setpoint()
            .times(1)
            .returning(|_| Err(ComponentError::Link("radio timeout".to_string())));

        let state = Arc::new(StateCell::new());
        state.set(ConnectionState::Connected);
        let forwarder = SetpointForwarder::new(Arc::new(driver), state);

        assert!(!forwarder.send_setpoint(Setpoint::ZERO).await);
    }
}
