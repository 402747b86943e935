use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// OpenWeather API keys are 32 hex characters; anything else is rejected
/// before a request is made.
pub const API_KEY_LEN: usize = 32;

/// 5 days of forecast at 3-hour resolution.
pub const FORECAST_POINTS: u32 = 40;

const DEFAULT_CITY: &str = "Vijayawada";
const DEFAULT_OUTPUT: &str = "weather_dashboard.png";

/// Unit system passed through to the provider. No conversion happens on our
/// side; the requested system decides what the numbers mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Axis label for temperatures in this unit system.
    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Metric => "Temperature (°C)",
            Units::Imperial => "Temperature (°F)",
        }
    }

    /// Axis label for wind speeds in this unit system.
    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            Units::Metric => "Wind Speed (m/s)",
            Units::Imperial => "Wind Speed (mph)",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow!(
                "Unknown unit system '{value}'. Supported systems: metric, imperial."
            )),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Example TOML:
    /// api_key = "..."
    pub api_key: Option<String>,

    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default)]
    pub units: Units,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            city: default_city(),
            units: Units::default(),
            output: default_output(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the built-in defaults if no file
    /// exists yet. The `OPENWEATHER_API_KEY` environment variable always wins
    /// over a key stored in the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;

        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            // First run: no config file, use defaults.
            Self::default()
        };

        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.is_empty() {
                cfg.api_key = Some(key);
            }
        }

        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// A key of the wrong length never reaches the network. This encodes
    /// OpenWeather's current key format; a format change on their side is a
    /// one-line fix here.
    pub fn api_key_is_plausible(key: &str) -> bool {
        key.len() == API_KEY_LEN
    }
}
