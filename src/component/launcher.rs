//! # Launcher
//!
//! Minimal host for [`Component`]s: activates them, ticks them at a fixed
//! rate and shuts them down again when the run ends.
//!
//! Every component that was activated is shut down before [`Launcher::bringup`]
//! or [`Launcher::run_for`] return, whatever ends the run.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::Component;
use crate::config::ComponentConfig;

/// Launcher scheduling options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub tick_interval: Duration,
    pub activate_all_on_start: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::from(&ComponentConfig::default())
    }
}

impl From<&ComponentConfig> for LauncherConfig {
    fn from(config: &ComponentConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            activate_all_on_start: config.activate_all_on_start,
        }
    }
}

struct Slot {
    component: Box<dyn Component>,
    active: bool,
}

pub struct Launcher {
    config: LauncherConfig,
    slots: Vec<Slot>,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
        }
    }

    pub fn add_component(&mut self, component: Box<dyn Component>) {
        info!("Adding component '{}'", component.name());
        self.slots.push(Slot {
            component,
            active: false,
        });
    }

    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.active && slot.component.name() == name)
    }

    /// Activate one component by name, returns `false` if unknown or already active
    pub async fn activate(&mut self, name: &str) -> bool {
        match self
            .slots
            .iter_mut()
            .find(|slot| !slot.active && slot.component.name() == name)
        {
            Some(slot) => {
                Self::activate_slot(slot).await;
                true
            }
            None => false,
        }
    }

    /// Run until Ctrl+C
    ///
    /// # Returns
    ///
    /// * `u64` - Number of ticks executed
    pub async fn bringup(&mut self) -> u64 {
        info!("Press Ctrl+C to exit");
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down...");
        };
        self.run(shutdown, None).await
    }

    /// Run for a fixed number of ticks
    pub async fn run_for(&mut self, ticks: u64) -> u64 {
        self.run(std::future::pending::<()>(), Some(ticks)).await
    }

    async fn run(&mut self, shutdown: impl Future<Output = ()>, max_ticks: Option<u64>) -> u64 {
        if self.config.activate_all_on_start {
            for slot in self.slots.iter_mut().filter(|slot| !slot.active) {
                Self::activate_slot(slot).await;
            }
        }

        let mut tick_interval = interval(self.config.tick_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting execution loop every {:?} for {} component(s)",
            self.config.tick_interval,
            self.slots.len()
        );

        tokio::pin!(shutdown);
        let mut tick_count: u64 = 0;

        while max_ticks.map_or(true, |max| tick_count < max) {
            tokio::select! {
                _ = tick_interval.tick() => {
                    for slot in self.slots.iter_mut().filter(|slot| slot.active) {
                        slot.component.tick().await;
                        log_status(slot.component.as_ref());
                    }
                    tick_count += 1;
                }

                _ = &mut shutdown => break,
            }
        }

        self.shutdown_all().await;
        info!("Total ticks executed: {}", tick_count);
        tick_count
    }

    async fn activate_slot(slot: &mut Slot) {
        info!("Activating component '{}'", slot.component.name());
        slot.component.activate().await;
        slot.active = true;
    }

    async fn shutdown_all(&mut self) {
        for slot in self.slots.iter_mut().rev().filter(|slot| slot.active) {
            info!("Shutting down component '{}'", slot.component.name());
            slot.component.shutdown().await;
            slot.active = false;
        }
    }
}

fn log_status(component: &dyn Component) {
    match serde_json::to_string(&component.status()) {
        Ok(json) => debug!("status {}", json),
        Err(e) => warn!("Failed to serialize status of '{}': {}", component.name(), e),
    }
}
