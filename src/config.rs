use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_COUNTRIES_API: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";
pub const DEFAULT_EXCHANGE_API: &str = "https://open.er-api.com/v6/latest/USD";

/// Upper bounds on the upstream request timeouts
pub const MAX_COUNTRIES_TIMEOUT_SECS: u64 = 15;
pub const MAX_RATES_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub countries_api_url: String,
    pub exchange_api_url: String,
    pub database_url: String,
    pub countries_timeout_secs: u64,
    pub rates_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub summary_top_n: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_api_url: DEFAULT_COUNTRIES_API.to_string(),
            exchange_api_url: DEFAULT_EXCHANGE_API.to_string(),
            database_url: "sqlite://countries.db".to_string(),
            countries_timeout_secs: MAX_COUNTRIES_TIMEOUT_SECS,
            rates_timeout_secs: MAX_RATES_TIMEOUT_SECS,
            output_dir: PathBuf::from("output"),
            summary_top_n: 5,
        }
    }
}

impl Config {
    pub fn countries_timeout(&self) -> Duration {
        Duration::from_secs(self.countries_timeout_secs.clamp(1, MAX_COUNTRIES_TIMEOUT_SECS))
    }

    pub fn rates_timeout(&self) -> Duration {
        Duration::from_secs(self.rates_timeout_secs.clamp(1, MAX_RATES_TIMEOUT_SECS))
    }

    /// Environment variables take precedence over the config file
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup("COUNTRIES_API") {
            self.countries_api_url = url;
        }
        if let Some(url) = lookup("EXCHANGE_API") {
            self.exchange_api_url = url;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// Load the config file, falling back to defaults when it does not exist,
/// then apply environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut config = if path.exists() {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        Config::default()
    };
    config.apply_env();
    Ok(config)
}
