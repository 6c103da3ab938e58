use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    geocode::DEFAULT_GEOCODER_URL, model::Location, source::nws::DEFAULT_API_BASE_URL,
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// user_agent = "(forecast, you@example.com)"
/// latitude = 35.4676
/// longitude = -97.5164
/// station = "KOKC"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sent as `User-Agent` on every request; api.weather.gov rejects
    /// requests without one.
    pub user_agent: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Observation station used for `current` when no location is given.
    pub station: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar_station: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_url: Option<String>,
}

impl Config {
    pub fn new(user_agent: String, latitude: f64, longitude: f64, station: String) -> Self {
        Self {
            user_agent,
            latitude,
            longitude,
            station,
            radar_station: None,
            api_base_url: None,
            geocoder_url: None,
        }
    }

    /// Load and validate config from `path`. A missing file is an error:
    /// there is no usable default location.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "No configuration found at {}.\n\
                 Hint: run `forecast configure` to set your location and user agent.",
                path.display()
            );
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            bail!("`user_agent` must not be empty; api.weather.gov requires one");
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            bail!("`latitude` must be between -90 and 90, got {}", self.latitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            bail!("`longitude` must be between -180 and 180, got {}", self.longitude);
        }
        if self.station.trim().is_empty() {
            bail!("`station` must not be empty");
        }
        Ok(())
    }

    /// The configured home location, with its default stations.
    pub fn default_location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
            station: Some(self.station.clone()),
            radar_station: self.radar_station.clone(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn geocoder_url(&self) -> &str {
        self.geocoder_url.as_deref().unwrap_or(DEFAULT_GEOCODER_URL)
    }
}
