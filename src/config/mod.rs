use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/cricket.toml";

/// Flag shown for countries missing from the table
pub const UNKNOWN_COUNTRY_FLAG: &str = "🌍";

/// Bot settings loaded from `config/cricket.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub timeouts: Timeouts,
    /// Country name to flag emoji
    #[serde(default)]
    pub countries: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_view_secs")]
    pub view_secs: u64,
    #[serde(default = "default_swap_secs")]
    pub swap_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            view_secs: default_view_secs(),
            swap_secs: default_swap_secs(),
        }
    }
}

fn default_prefix() -> String {
    "cm".to_string()
}

fn default_view_secs() -> u64 {
    60
}

fn default_swap_secs() -> u64 {
    30
}

impl BotConfig {
    /// Load bot configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: BotConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Flag emoji for a country, falling back to a globe
    pub fn flag_for(&self, country: &str) -> &str {
        self.countries
            .get(country)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_COUNTRY_FLAG)
    }

    pub fn view_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.view_secs)
    }

    pub fn swap_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.swap_secs)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            prefix: default_prefix(),
            timeouts: Timeouts::default(),
            countries: HashMap::new(),
        }
    }
}

/// Initialize the bot configuration, honouring `CRICKET_CONFIG` if set
pub fn init_config() -> Result<BotConfig, Box<dyn std::error::Error>> {
    let config_path =
        std::env::var("CRICKET_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    BotConfig::load_from_file(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_cricket_config() {
        let result = BotConfig::load_from_file(DEFAULT_CONFIG_PATH);
        assert!(
            result.is_ok(),
            "Failed to load cricket config: {:?}",
            result.err()
        );

        if let Ok(config) = result {
            assert_eq!(config.prefix, "cm");
            assert_eq!(config.view_timeout(), Duration::from_secs(60));
            assert_eq!(config.swap_timeout(), Duration::from_secs(30));
            assert_eq!(config.flag_for("India"), "🇮🇳");
            assert_eq!(config.flag_for("West Indies"), "🇯🇲");
        }
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config.prefix, "cm");
        assert_eq!(config.timeouts.view_secs, 60);
        assert_eq!(config.timeouts.swap_secs, 30);
        assert_eq!(config.flag_for("Netherlands"), UNKNOWN_COUNTRY_FLAG);
    }
}
