//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Prediction/reconciliation parameters.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// The parameter surface of the prediction simulation.
///
/// Passed immutably into each update call; toggling a value between frames
/// is fine, mutating one mid-update is not possible by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Rewind-resimulate when the authoritative state diverges from the
    /// recorded prediction.
    pub error_correction: bool,
    /// Decay a visual-only offset over corrections instead of snapping.
    pub correction_smoothing: bool,
    /// Resend all unacknowledged input ticks in every report (loss
    /// mitigation at the cost of bandwidth).
    pub redundant_input: bool,
    /// Probability in `[0, 1]` that a message is lost before enqueue.
    pub packet_loss: f32,
    /// One-way simulated latency in seconds (≥ 0).
    pub network_latency: f64,
    /// Snapshot emission cadence: the server emits a snapshot only on ticks
    /// divisible by this. Must be a power of two; 1 = every tick.
    pub snapshot_rate: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            error_correction: true,
            correction_smoothing: true,
            redundant_input: true,
            packet_loss: 0.05,
            network_latency: 0.1,
            snapshot_rate: 1,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Checks every parameter against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.packet_loss) || !self.packet_loss.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "packet_loss",
                reason: format!("{} is not in [0, 1]", self.packet_loss),
            });
        }
        if !self.network_latency.is_finite() || self.network_latency < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "network_latency",
                reason: format!("{} is not a finite non-negative duration", self.network_latency),
            });
        }
        if !self.snapshot_rate.is_power_of_two() {
            return Err(ConfigError::InvalidValue {
                field: "snapshot_rate",
                reason: format!("{} is not a nonzero power of two", self.snapshot_rate),
            });
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.simulation.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.simulation.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
