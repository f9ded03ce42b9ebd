use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::services::{mileage_service, DEFAULT_DISPLAY_CAP, DISTANCE_UNIT},
    domain::QuantityUnit,
    errors::Result,
    utils::persistence::{self, write_atomic},
};

/// User preferences consumed by the presentation layer and the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Display currency; amounts are never converted.
    pub currency: String,
    /// Label for odometer distances in mileage figures.
    #[serde(default = "Config::default_distance_unit")]
    pub distance_unit: String,
    #[serde(default = "Config::default_calendar_display_cap")]
    pub calendar_display_cap: usize,
    /// Identity whose ledger is opened by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Optional custom directory for ledger data. Defaults to `~/.ride_ledger/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "INR".into(),
            distance_unit: Self::default_distance_unit(),
            calendar_display_cap: Self::default_calendar_display_cap(),
            identity: None,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_distance_unit() -> String {
        DISTANCE_UNIT.into()
    }

    pub fn default_calendar_display_cap() -> usize {
        DEFAULT_DISPLAY_CAP
    }

    /// Mileage label for `unit` in the configured distance unit, e.g. `km/L`.
    pub fn mileage_unit_label(&self, unit: QuantityUnit) -> String {
        mileage_service::unit_label_with(&self.distance_unit, unit)
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(persistence::data_dir)
    }
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_path(persistence::config_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self::with_path(base.join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config, falling back to defaults when none has been saved.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
