use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::debug;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FreightCostCalculator";
const APP_NAME: &str = "FreightCostCalculator";
const SETTINGS_FILENAME: &str = "settings.json";

/// User defaults, stored as JSON in the platform config directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overrides the snapshot location in the app data directory.
    pub snapshot_path: Option<PathBuf>,
    pub include_dp: bool,
    pub include_other_costs: bool,
    pub log_filter: String,
    /// Exports older than this are reported as stale.
    pub snapshot_max_age_days: u32,
    pub expiring_within_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            include_dp: false,
            include_other_costs: true,
            log_filter: "info".to_string(),
            snapshot_max_age_days: 7,
            expiring_within_days: 14,
        }
    }
}

impl Settings {
    pub fn snapshot_max_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.snapshot_max_age_days) * 86400)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILENAME))
}

/// Loads settings from the config directory. A missing file gives the defaults.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let path = settings_file().ok_or(SettingsError::StorageUnavailable)?;
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Settings::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Saves to the config directory and returns the file written.
pub fn save_settings(settings: &Settings) -> Result<PathBuf, SettingsError> {
    let path = settings_file().ok_or(SettingsError::StorageUnavailable)?;
    save_settings_to(&path, settings)?;
    Ok(path)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
