//! # Component Module
//!
//! Lifecycle interface between components and the [`launcher::Launcher`]
//! that drives them.
//!
//! A component is constructed with a name and its configuration, activated
//! once at bring-up, ticked periodically while running and shut down when
//! the launcher stops.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod crazyflie;
pub mod launcher;

pub use crazyflie::CrazyflieComponent;
pub use launcher::{Launcher, LauncherConfig};

/// Point-in-time status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub name: String,
    pub address: String,
    pub connected: bool,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle hooks a launcher calls on a component
#[async_trait]
pub trait Component: Send {
    fn name(&self) -> &str;

    /// Bring the component up, called once before the first tick
    async fn activate(&mut self);

    /// Periodic execution step
    async fn tick(&mut self);

    /// Release resources acquired by `activate`
    async fn shutdown(&mut self);

    fn status(&self) -> ComponentStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_to_json() {
        let timestamp = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let status = ComponentStatus {
            name: "test".to_string(),
            address: "radio://0/80/2M/E7E7E7E7E7".to_string(),
            connected: true,
            timestamp,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["name"], "test");
        assert_eq!(json["address"], "radio://0/80/2M/E7E7E7E7E7");
        assert_eq!(json["connected"], true);
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
    }
}
