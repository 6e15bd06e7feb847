//! # Crazyflie Component
//!
//! Connects to one Crazyflie and runs the motor ramp demonstration on every
//! launcher tick.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (`CRAZYFLIE_CONFIG` or first argument, defaults otherwise)
//!    - Set up logging with tracing subscriber
//!    - Resolve the link URI (`CFLIB_URI` overrides the configured one)
//!    - Initialize the driver backend for that URI, once
//!
//! 2. **Main Loop**
//!    - Activate the component (connect, arm)
//!    - Tick it every `tick_interval_ms`, each tick ramps the motors
//!    - Handle Ctrl+C for graceful shutdown
//!
//! 3. **Graceful Shutdown**
//!    - Close the link
//!    - Log total tick count
//!
//! # Examples
//!
//! Run against the simulated Crazyflie:
//! ```bash
//! CFLIB_URI=sim://loopback cargo run --release
//! ```
//!
//! Run against real hardware:
//! ```bash
//! cargo run --release --features radio -- config/default.toml
//! ```

use anyhow::{Context, Result};
use tracing::info;

use crazyflie_component::component::{CrazyflieComponent, Launcher, LauncherConfig};
use crazyflie_component::config::Config;
use crazyflie_component::driver::init_drivers;
use crazyflie_component::link::LinkAddress;
use crazyflie_component::logging;

/// Environment variable naming the configuration file
const CONFIG_ENV_VAR: &str = "CRAZYFLIE_CONFIG";

fn load_config() -> Result<Config> {
    let path = std::env::var(CONFIG_ENV_VAR)
        .ok()
        .or_else(|| std::env::args().nth(1));

    match path {
        Some(path) => {
            Config::load(&path).with_context(|| format!("failed to load configuration from {}", path))
        }
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    // Initialize logging
    let _log_guard = logging::init(&config.logging);

    info!("Crazyflie component v{} starting...", env!("CARGO_PKG_VERSION"));

    let address = LinkAddress::from_env(&config.link.uri)?;
    let driver = init_drivers(&config.link, &address)?;

    let component = CrazyflieComponent::from_config(&config, address, driver);

    let mut launcher = Launcher::new(LauncherConfig::from(&config.component));
    launcher.add_component(Box::new(component));

    launcher.bringup().await;

    Ok(())
}
