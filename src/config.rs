use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "scholartrack";
pub const DATA_DIR_ENV: &str = "SCHOLARTRACK_DATA_DIR";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where records are stored, one JSON file per key.
    pub data_dir: Option<PathBuf>,
    /// JSON question pool; the bundled sample pool when unset.
    pub question_pool: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Data directory with the environment override applied.
    pub fn resolved_data_dir(&self) -> Result<PathBuf, AppError> {
        // 1. Environment variable wins
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let dir = dir.trim();
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        // 2. Config file, then the platform default
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir().ok_or_else(|| {
            AppError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Data directory not found",
            ))
        })?;
        Ok(base.join(APP_DIR))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    let config_dir = dirs::config_dir().ok_or(AppError::IoError(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Config directory not found",
    )))?;
    Ok(config_dir.join(APP_DIR).join("config.toml"))
}

/// The user's config, or defaults when there is no config file.
pub fn load() -> Result<Config, AppError> {
    match config_path() {
        Ok(path) => load_from(&path),
        Err(_) => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config, AppError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

pub fn save(config: &Config) -> Result<(), AppError> {
    save_to(config, &config_path()?)
}

pub fn save_to(config: &Config, path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml_string = toml::to_string(config)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(toml_string.as_bytes())?;
    Ok(())
}
