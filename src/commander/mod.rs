//! # Commander Module
//!
//! Low-level flight commands sent over an established link.
//!
//! This module handles:
//! - Relaying roll/pitch/yaw-rate/thrust setpoints while connected
//! - The scripted open-loop motor ramp used as a self-test

pub mod demo;
pub mod setpoint;

pub use demo::{thrust_ramp, DemoSequencer, RampProfile};
pub use setpoint::{Setpoint, SetpointForwarder};
