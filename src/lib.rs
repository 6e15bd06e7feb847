//! # Crazyflie Component Library
//!
//! Run a Crazyflie quadcopter as a lifecycle-managed component.
//!
//! This library provides:
//! - Link supervision: open a radio link, track its state from link events,
//!   wait for the connection with a timeout
//! - Setpoint forwarding, guarded by the connection state
//! - A scripted motor ramp used as a self-test
//! - A small launcher that activates, ticks and shuts down components
//!
//! The radio protocol itself is handled by `crazyflie-lib` (cargo feature
//! `radio`); `sim://` links run against an in-process simulated Crazyflie.

pub mod commander;
pub mod component;
pub mod config;
pub mod driver;
pub mod error;
pub mod link;
pub mod logging;
