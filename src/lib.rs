//! mudcombat - turn-based melee combat for MUD worlds
//!
//! Dice, attack and damage resolution, and a per-actor attack loop driven
//! by one-shot timers.

pub mod arena;
pub mod combat;
pub mod commands;
pub mod messaging;
pub mod timers;
pub mod world;

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub use arena::{Arena, FollowUp};

/// Prefix for environment overrides, e.g. `MUDCOMBAT_COOLDOWN_MS=500`
pub const ENV_PREFIX: &str = "MUDCOMBAT_";

/// Combat configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Delay between an actor's consecutive attacks, in milliseconds
    pub cooldown_ms: u64,
    /// How often the event loop checks for due timers, in milliseconds
    pub tick_interval_ms: u64,
    /// Fixed dice seed; random when unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cooldown_ms: combat::DEFAULT_COOLDOWN.as_millis() as u64,
            tick_interval_ms: 100,
            seed: None,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file if given, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).extract()
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cooldown(), Duration::from_secs(1));
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cooldown_ms = 2500\nseed = 42").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.cooldown(), Duration::from_millis(2500));
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_load_rejects_bad_types() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cooldown_ms = \"soon\"").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
