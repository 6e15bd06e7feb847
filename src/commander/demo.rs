//! # Motor Ramp Demonstration
//!
//! Open-loop self-test: unlock thrust, ramp the motors up from `min_thrust`
//! to `max_thrust` and back down, then "land" by streaming zero setpoints.
//! Purely time-driven, no sensor feedback.
//!
//! ## Default Sequence
//!
//! | Phase   | Setpoints                              | Pacing |
//! |---------|----------------------------------------|--------|
//! | Unlock  | 1 × thrust 0                           | none   |
//! | Ramp up | 20000, 20500, ..., 25000               | 100 ms |
//! | Ramp down | 24500, 24000, ..., 20000             | 100 ms |
//! | Landing | 30 × thrust 0                          | 100 ms |

use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::setpoint::{Setpoint, SetpointForwarder};
use crate::config::DemoConfig;

/// Thrust limits and pacing of the ramp
#[derive(Debug, Clone, PartialEq)]
pub struct RampProfile {
    pub min_thrust: u16,
    pub max_thrust: u16,
    pub thrust_step: u16,
    pub step_interval: Duration,
    pub landing_setpoints: usize,
}

impl Default for RampProfile {
    fn default() -> Self {
        Self::from(&DemoConfig::default())
    }
}

impl From<&DemoConfig> for RampProfile {
    fn from(config: &DemoConfig) -> Self {
        Self {
            min_thrust: config.min_thrust,
            max_thrust: config.max_thrust,
            thrust_step: config.thrust_step,
            step_interval: config.step_interval(),
            landing_setpoints: config.landing_setpoints,
        }
    }
}

/// Thrust values of one up-and-down ramp
///
/// Starts at `min`, climbs by `step` until `max` is reached (the last climb
/// is clamped to `max`), then descends by `step` while the value stays at or
/// above `min`.
///
/// # Examples
///
/// ```
/// use crazyflie_component::commander::thrust_ramp;
///
/// assert_eq!(thrust_ramp(100, 300, 100), vec![100, 200, 300, 200, 100]);
/// ```
pub fn thrust_ramp(min: u16, max: u16, step: u16) -> Vec<u16> {
    if step == 0 || min >= max {
        return vec![min];
    }

    let (min, max, step) = (i32::from(min), i32::from(max), i32::from(step));
    let mut ramp = Vec::new();
    let mut thrust = min;
    let mut climbing = true;

    while thrust >= min {
        ramp.push(thrust as u16);
        if thrust >= max {
            climbing = false;
        }
        thrust = if climbing {
            (thrust + step).min(max)
        } else {
            thrust - step
        };
    }

    ramp
}

/// Runs the scripted motor ramp through a [`SetpointForwarder`]
pub struct DemoSequencer {
    forwarder: SetpointForwarder,
    profile: RampProfile,
}

impl DemoSequencer {
    pub fn new(forwarder: SetpointForwarder, profile: RampProfile) -> Self {
        Self { forwarder, profile }
    }

    pub fn profile(&self) -> &RampProfile {
        &self.profile
    }

    /// Ramp the motors up and down, then land
    ///
    /// Once started the sequence always runs to the end with its full pacing.
    /// Steps sent while the link is down are dropped by the forwarder.
    ///
    /// # Returns
    ///
    /// * `true` if every setpoint of the sequence was forwarded
    /// * `false` if the link was not connected at start, or some setpoints
    ///   were dropped
    pub async fn ramp_motors(&self) -> bool {
        if !self.forwarder.is_connected() {
            warn!("Cannot ramp motors: Not connected to Crazyflie");
            return false;
        }

        let profile = &self.profile;
        info!(
            "Ramping motors {} -> {} -> {} (step {})",
            profile.min_thrust, profile.max_thrust, profile.min_thrust, profile.thrust_step
        );

        let mut dropped = 0usize;

        // Unlock startup thrust protection
        if !self.forwarder.send_setpoint(Setpoint::ZERO).await {
            dropped += 1;
        }

        for thrust in thrust_ramp(profile.min_thrust, profile.max_thrust, profile.thrust_step) {
            if !self.forwarder.send_setpoint(Setpoint::thrust(thrust)).await {
                dropped += 1;
            }
            sleep(profile.step_interval).await;
        }

        for _ in 0..profile.landing_setpoints {
            if !self.forwarder.send_setpoint(Setpoint::ZERO).await {
                dropped += 1;
            }
            sleep(profile.step_interval).await;
        }

        if dropped > 0 {
            warn!("Motor ramp finished with {} setpoint(s) dropped", dropped);
            return false;
        }

        info!("Motor ramp complete");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mocks::RecordingDriver;
    use crate::driver::MockFlightDriver;
    use crate::link::{ConnectionState, StateCell};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn connected_sequencer(driver: &RecordingDriver) -> (DemoSequencer, Arc<StateCell>) {
        let state = Arc::new(StateCell::new());
        state.set(ConnectionState::Connected);
        let forwarder = SetpointForwarder::new(Arc::new(driver.clone()), state.clone());
        (DemoSequencer::new(forwarder, RampProfile::default()), state)
    }

    #[test]
    fn test_default_ramp_values() {
        let ramp = thrust_ramp(20_000, 25_000, 500);

        // 11 values up (20000..=25000), 10 values down (24500..=20000)
        assert_eq!(ramp.len(), 21);
        assert_eq!(ramp.first(), Some(&20_000));
        assert_eq!(ramp[10], 25_000);
        assert_eq!(ramp.last(), Some(&20_000));
    }

    #[test]
    fn test_ramp_clamps_to_max() {
        let ramp = thrust_ramp(20_000, 25_200, 500);
        assert_eq!(*ramp.iter().max().unwrap(), 25_200);
        assert!(ramp.iter().all(|&t| (20_000..=25_200).contains(&t)));
    }

    #[test]
    fn test_ramp_from_zero() {
        assert_eq!(thrust_ramp(0, 1000, 500), vec![0, 500, 1000, 500, 0]);
    }

    #[test]
    fn test_ramp_degenerate_inputs() {
        assert_eq!(thrust_ramp(20_000, 25_000, 0), vec![20_000]);
        assert_eq!(thrust_ramp(25_000, 25_000, 500), vec![25_000]);
    }

    #[test]
    fn test_ramp_with_full_range() {
        let ramp = thrust_ramp(0, u16::MAX, u16::MAX);
        assert_eq!(ramp, vec![0, u16::MAX, 0]);
    }

    #[test]
    fn test_default_profile() {
        let profile = RampProfile::default();
        assert_eq!(profile.min_thrust, 20_000);
        assert_eq!(profile.max_thrust, 25_000);
        assert_eq!(profile.thrust_step, 500);
        assert_eq!(profile.step_interval, Duration::from_millis(100));
        assert_eq!(profile.landing_setpoints, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_motors_sequence() {
        let driver = RecordingDriver::new();
        let (sequencer, _state) = connected_sequencer(&driver);

        assert!(sequencer.ramp_motors().await);

        let thrusts: Vec<u16> = driver.get_setpoints().iter().map(|sp| sp.thrust).collect();
        assert_eq!(thrusts.len(), 1 + 21 + 30);

        // Unlock
        assert_eq!(thrusts[0], 0);

        // Strictly increasing then strictly decreasing, bounded
        let ramp = &thrusts[1..22];
        assert!(ramp.iter().all(|&t| (20_000..=25_000).contains(&t)));
        let peak = ramp.iter().position(|&t| t == 25_000).unwrap();
        assert!(ramp[..=peak].windows(2).all(|w| w[0] < w[1]));
        assert!(ramp[peak..].windows(2).all(|w| w[0] > w[1]));

        // Landing
        assert!(thrusts[22..].iter().all(|&t| t == 0));
        assert_eq!(thrusts[22..].len(), 30);

        // Every setpoint is level
        assert!(driver
            .get_setpoints()
            .iter()
            .all(|sp| sp.roll == 0.0 && sp.pitch == 0.0 && sp.yaw_rate == 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_motors_is_paced() {
        let driver = RecordingDriver::new();
        let (sequencer, _state) = connected_sequencer(&driver);

        let start = Instant::now();
        sequencer.ramp_motors().await;

        // 21 ramp steps + 30 landing steps at 100ms each
        assert_eq!(start.elapsed(), Duration::from_millis(5100));
    }

    #[tokio::test]
    async fn test_ramp_motors_requires_connection() {
        let mut driver = MockFlightDriver::new();
        driver.expect_send_setpoint().never();

        let forwarder = SetpointForwarder::new(Arc::new(driver), Arc::new(StateCell::new()));
        let sequencer = DemoSequencer::new(forwarder, RampProfile::default());

        assert!(!sequencer.ramp_motors().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_runs_to_completion_when_link_lost() {
        let driver = RecordingDriver::new();
        let (sequencer, state) = connected_sequencer(&driver);
        let sequencer = Arc::new(sequencer);

        let start = Instant::now();
        let task = {
            let sequencer = sequencer.clone();
            tokio::spawn(async move { sequencer.ramp_motors().await })
        };

        // Unlock + 5 ramp steps go out before the link drops
        tokio::time::sleep(Duration::from_millis(450)).await;
        state.set(ConnectionState::Disconnected);

        assert!(!task.await.unwrap());
        assert_eq!(driver.get_setpoints().len(), 6);

        // Remaining steps keep their pacing
        assert_eq!(start.elapsed(), Duration::from_millis(5100));
    }
}
