//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field has a default, so an empty file (or no file
//! at all, see [`Config::default`]) yields a working setup that talks to
//! `radio://0/80/2M/E7E7E7E7E7`.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ComponentError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub component: ComponentConfig,

    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub demo: DemoConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Component lifecycle configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ComponentConfig {
    #[serde(default = "default_component_name")]
    pub name: String,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_activate_all_on_start")]
    pub activate_all_on_start: bool,
}

/// Radio link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// Link URI, overridden at runtime by `CFLIB_URI`
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_arm_grace_ms")]
    pub arm_grace_ms: u64,

    /// Only used by `sim://` links
    #[serde(default = "default_sim_connect_delay_ms")]
    pub sim_connect_delay_ms: u64,
}

/// Motor ramp demonstration configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DemoConfig {
    #[serde(default = "default_min_thrust")]
    pub min_thrust: u16,

    #[serde(default = "default_max_thrust")]
    pub max_thrust: u16,

    #[serde(default = "default_thrust_step")]
    pub thrust_step: u16,

    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    #[serde(default = "default_landing_setpoints")]
    pub landing_setpoints: usize,
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

// Default value functions
fn default_component_name() -> String { "test".to_string() }
fn default_tick_interval_ms() -> u64 { 1000 }
fn default_activate_all_on_start() -> bool { true }

fn default_uri() -> String { "radio://0/80/2M/E7E7E7E7E7".to_string() }
fn default_cache_dir() -> String { "./cache".to_string() }
fn default_connect_timeout_ms() -> u64 { 10_000 }
fn default_arm_grace_ms() -> u64 { 1000 }
fn default_sim_connect_delay_ms() -> u64 { 200 }

fn default_min_thrust() -> u16 { 20_000 }
fn default_max_thrust() -> u16 { 25_000 }
fn default_thrust_step() -> u16 { 500 }
fn default_step_interval_ms() -> u64 { 100 }
fn default_landing_setpoints() -> usize { 30 }

fn default_file_prefix() -> String { "crazyflie-component.log".to_string() }

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            name: default_component_name(),
            tick_interval_ms: default_tick_interval_ms(),
            activate_all_on_start: default_activate_all_on_start(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            cache_dir: default_cache_dir(),
            connect_timeout_ms: default_connect_timeout_ms(),
            arm_grace_ms: default_arm_grace_ms(),
            sim_connect_delay_ms: default_sim_connect_delay_ms(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            min_thrust: default_min_thrust(),
            max_thrust: default_max_thrust(),
            thrust_step: default_thrust_step(),
            step_interval_ms: default_step_interval_ms(),
            landing_setpoints: default_landing_setpoints(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl ComponentConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl LinkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn arm_grace(&self) -> Duration {
        Duration::from_millis(self.arm_grace_ms)
    }

    pub fn sim_connect_delay(&self) -> Duration {
        Duration::from_millis(self.sim_connect_delay_ms)
    }
}

impl DemoConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crazyflie_component::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.component.name.is_empty() {
            return Err(invalid("component name cannot be empty"));
        }

        if self.component.tick_interval_ms == 0 || self.component.tick_interval_ms > 60_000 {
            return Err(invalid("tick_interval_ms must be between 1 and 60000"));
        }

        if self.link.uri.trim().is_empty() {
            return Err(invalid("link uri cannot be empty"));
        }

        if self.link.connect_timeout_ms == 0 || self.link.connect_timeout_ms > 60_000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.link.arm_grace_ms > 10_000 {
            return Err(invalid("arm_grace_ms must be at most 10000"));
        }

        if self.demo.min_thrust >= self.demo.max_thrust {
            return Err(invalid("min_thrust must be less than max_thrust"));
        }

        if self.demo.thrust_step == 0 {
            return Err(invalid("thrust_step must be greater than 0"));
        }

        if self.demo.step_interval_ms == 0 || self.demo.step_interval_ms > 10_000 {
            return Err(invalid("step_interval_ms must be between 1 and 10000"));
        }

        if self.demo.landing_setpoints == 0 {
            return Err(invalid("landing_setpoints must be greater than 0"));
        }

        if let Some(dir) = &self.logging.dir {
            if dir.is_empty() {
                return Err(invalid("logging dir cannot be empty when set"));
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> ComponentError {
    ComponentError::Config(toml::de::Error::custom(msg))
}
