//! # Link Module
//!
//! Radio link supervision for a single Crazyflie.
//!
//! This module handles:
//! - Resolving the link address (config default, `CFLIB_URI` override)
//! - Tracking the connection state driven by link events
//! - Opening the link and waiting for the connection with a timeout

pub mod address;
pub mod state;
pub mod supervisor;

pub use address::LinkAddress;
pub use state::{ConnectionState, StateCell};
pub use supervisor::{ConnectionSupervisor, SupervisorSettings};
