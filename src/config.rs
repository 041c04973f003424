// Engine configuration - RON file with defaults for every field

use crate::sequencer::timing::{DEFAULT_PPQ, TimingDivision};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Highest clock resolution accepted
pub const MAX_PPQ: u32 = 960;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Sequencer engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Clock ticks per quarter note on the timing bus
    pub ppq: u32,

    /// Step length at startup
    pub division: TimingDivision,

    /// Queue size of each timing bus subscriber
    pub bus_capacity: usize,

    /// UI → engine command queue size
    pub command_capacity: usize,

    /// Engine → UI event queue size
    pub event_capacity: usize,

    /// Engine thread sleep when idle
    pub poll_interval_ms: u64,

    /// Seed for pattern generation and Random direction (reproducible runs)
    pub random_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ppq: DEFAULT_PPQ,
            division: TimingDivision::Sixteenth,
            bus_capacity: 256,
            command_capacity: 128,
            event_capacity: 512,
            poll_interval_ms: 1,
            random_seed: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Load a configuration file, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring configuration {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse and validate RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Write the configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PPQ).contains(&self.ppq) {
            return Err(ConfigError::Invalid(format!(
                "ppq must be between 1 and {}, got {}",
                MAX_PPQ, self.ppq
            )));
        }
        if self.bus_capacity == 0 || self.command_capacity == 0 || self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Queue capacities must be greater than 0".to_string(),
            ));
        }
        if !self.division.is_exact_at(self.ppq) {
            log::warn!(
                "Division {} is not exact at {} PPQ",
                self.division,
                self.ppq
            );
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Default configuration path in the user config directory
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mymusic_stepseq").join("engine.ron"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.ppq, 24);
        assert_eq!(config.division, TimingDivision::Sixteenth);
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = EngineConfig::from_ron("(ppq: 96, random_seed: Some(7))").unwrap();
        assert_eq!(config.ppq, 96);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.event_capacity, 512);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            EngineConfig::from_ron("(ppq: 0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_ron("(bus_capacity: 0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_ron("(ppq: \"fast\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("conf").join("engine.ron");

        let config = EngineConfig {
            ppq: 48,
            division: TimingDivision::EighthTriplet,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);

        std::fs::write(&path, "not ron").unwrap();
        assert_eq!(EngineConfig::load_or_default(&path), EngineConfig::default());
        assert_eq!(
            EngineConfig::load_or_default(&temp.path().join("missing.ron")),
            EngineConfig::default()
        );
    }
}
