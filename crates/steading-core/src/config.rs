//! Simulation configuration, loaded from YAML.
//!
//! A single [`SimConfig`] covers the scheduler's base interval, the
//! perception and spatial tuning knobs, the planner endpoint and
//! cooldown, and the default world-generation parameters. Every field
//! has a serde default so a partial file (or none at all) still yields
//! a runnable configuration.

use serde::{Deserialize, Serialize};

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML did not parse into a [`SimConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yml::Error),
}

/// World generation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length of the square map, in world units.
    #[serde(default = "default_world_size")]
    pub size: f64,
    /// Number of agents to spawn.
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,
    /// Resources per square world unit.
    #[serde(default = "default_resource_density")]
    pub resource_density: f64,
    /// Optional RNG seed for reproducible worlds.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: default_world_size(),
            agent_count: default_agent_count(),
            resource_density: default_resource_density(),
            seed: None,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Scheduler period at speed 1, in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub base_tick_interval_ms: u64,
    /// How far agents can see, in world units.
    #[serde(default = "default_vision_radius")]
    pub vision_radius: f64,
    /// Spatial index cell size, in world units.
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    /// Minimum ticks between one agent's planning requests.
    #[serde(default = "default_planner_cooldown")]
    pub planner_cooldown_ticks: u64,
    /// Base URL of the external planning service.
    #[serde(default = "default_planner_url")]
    pub planner_url: String,
    /// Address the control surface binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// World generation defaults.
    #[serde(default)]
    pub world: WorldConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            base_tick_interval_ms: default_tick_interval(),
            vision_radius: default_vision_radius(),
            cell_size: default_cell_size(),
            planner_cooldown_ticks: default_planner_cooldown(),
            planner_url: default_planner_url(),
            bind_address: default_bind_address(),
            world: WorldConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed YAML.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(source)?)
    }

    /// Load a YAML file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }
}

fn default_world_size() -> f64 {
    200.0
}

fn default_agent_count() -> u32 {
    10
}

fn default_resource_density() -> f64 {
    0.005
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_vision_radius() -> f64 {
    15.0
}

fn default_cell_size() -> f64 {
    20.0
}

fn default_planner_cooldown() -> u64 {
    100
}

fn default_planner_url() -> String {
    String::from("http://127.0.0.1:8100")
}

fn default_bind_address() -> String {
    String::from("0.0.0.0:8080")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_documented_values() {
        let config = SimConfig::default();
        assert_eq!(config.base_tick_interval_ms, 1000);
        assert!((config.vision_radius - 15.0).abs() < f64::EPSILON);
        assert!((config.cell_size - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.planner_cooldown_ticks, 100);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config = SimConfig::from_yaml("base_tick_interval_ms: 250\n");
        assert!(config.is_ok());
        if let Ok(c) = config {
            assert_eq!(c.base_tick_interval_ms, 250);
            assert_eq!(c.planner_cooldown_ticks, 100);
            assert_eq!(c.world.agent_count, default_agent_count());
        }
    }

    #[test]
    fn nested_world_config_parses() {
        let yaml = "world:\n  size: 400.0\n  agent_count: 25\n  seed: 7\n";
        let config = SimConfig::from_yaml(yaml);
        assert!(config.is_ok());
        if let Ok(c) = config {
            assert!((c.world.size - 400.0).abs() < f64::EPSILON);
            assert_eq!(c.world.agent_count, 25);
            assert_eq!(c.world.seed, Some(7));
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = SimConfig::from_yaml(": not yaml : [");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
