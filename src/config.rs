use crate::error::{PitchCareError, Result};
use dialoguer::{Input, Password};
use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "pitchcare";
const CONFIG_FILE: &str = "config.yaml";
const DB_FILE: &str = "pitchcare.db";
const DATA_DIR_ENV: &str = "PITCHCARE_DATA_DIR";

pub const DEFAULT_WEATHER_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub weather: WeatherConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// True once an API key survived env substitution. An unresolved
    /// `${VAR}` placeholder counts as missing.
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && !key.starts_with("${")
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind.parse().map_err(|e| {
            PitchCareError::Config(format!("invalid server.bind '{}': {}", self.bind, e))
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = config_override
            .or_else(Self::find_config_path)
            .ok_or_else(|| {
                PitchCareError::Config(format!(
                    "No config file found (looked in {}). Run `pitchcare init` to set up.",
                    Self::search_paths()
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;

        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            PitchCareError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        Self::from_yaml(&config_str)
    }

    /// Parse YAML after substituting `${VAR}` references from the environment.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| PitchCareError::Config(format!("Failed to parse config: {}", e)))
    }

    /// `config/config.yaml` under the working directory, then the user config dir.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config").join(CONFIG_FILE)];
        paths.extend(Self::default_config_path().ok());
        paths
    }

    fn find_config_path() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.is_file())
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.is_file(),
            None => Self::find_config_path().is_some(),
        }
    }

    /// Where `init` writes: `<user config dir>/pitchcare/config.yaml`.
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| PitchCareError::Config("Cannot determine config directory".into()))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up pitchcare!");
        println!();

        println!("Visual Crossing weather (used to estimate rain damage)");
        let api_key: String = Password::new()
            .with_prompt("  API key (leave blank to use ${VISUAL_CROSSING_API_KEY})")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| PitchCareError::Config(format!("Input error: {}", e)))?;

        let timeout_secs: u64 = Input::new()
            .with_prompt("  Request timeout (seconds)")
            .default(default_timeout_secs())
            .interact_text()
            .map_err(|e| PitchCareError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("HTTP API");
        let bind: String = Input::new()
            .with_prompt("  Listen address")
            .default(default_bind())
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                input
                    .parse::<SocketAddr>()
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()
            .map_err(|e| PitchCareError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            weather: WeatherConfig {
                api_key: if api_key.is_empty() {
                    "${VISUAL_CROSSING_API_KEY}".into()
                } else {
                    api_key
                },
                base_url: default_weather_url(),
                timeout_secs,
            },
            server: ServerConfig { bind },
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| PitchCareError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# pitchcare configuration\n# Generated by `pitchcare init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        // Reload so the placeholder key resolves against the environment
        let config = Self::load(Some(config_path.clone()))?;
        Ok((config, config_path))
    }

    /// Replace `${VAR}` with the variable's value. Unset variables are left
    /// in place so `has_api_key` can tell they were never resolved.
    fn substitute_env_vars(content: &str) -> String {
        let Ok(re) = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return content.to_string();
        };
        re.replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
    }

    /// Resolve the data directory (`--data-dir`, then `PITCHCARE_DATA_DIR`,
    /// then the user data dir) and make sure it exists.
    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        let dir = match (data_dir_override, std::env::var_os(DATA_DIR_ENV)) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => PathBuf::from(dir),
            (None, None) => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| PitchCareError::Config("Cannot determine data directory".into()))?,
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join(DB_FILE))
    }
}
