//! Runtime configuration.
//!
//! The data directory comes from `--data-dir`, then `GUAUMIAU_DATA_DIR`, then
//! `./.guaumiau`. Inside it an optional `guaumiau.toml` may override the
//! database file name. No file means defaults; a file that does not parse is
//! an error.

use crate::core::error::GuauMiauError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "GUAUMIAU_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = ".guaumiau";
pub const CONFIG_FILE: &str = "guaumiau.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Database file name relative to the data directory.
    pub db_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_file: Option<String>,
}

impl AppConfig {
    pub fn load(data_dir_override: Option<&Path>) -> Result<Self, GuauMiauError> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        let file = load_file_config(&data_dir)?;
        if let Some(name) = &file.db_file {
            if name.trim().is_empty() || Path::new(name).components().count() != 1 {
                return Err(GuauMiauError::ConfigError(format!(
                    "db_file must be a plain file name, got '{}'",
                    name
                )));
            }
        }
        Ok(Self {
            data_dir,
            db_file: file.db_file,
        })
    }
}

fn resolve_data_dir(data_dir_override: Option<&Path>) -> Result<PathBuf, GuauMiauError> {
    if let Some(dir) = data_dir_override {
        return Ok(dir.to_path_buf());
    }
    match env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        Ok(_) | Err(env::VarError::NotPresent) => Ok(PathBuf::from(DEFAULT_DATA_DIR)),
        Err(e) => Err(e.into()),
    }
}

pub fn load_file_config(data_dir: &Path) -> Result<FileConfig, GuauMiauError> {
    let config_path = data_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(&config_path).map_err(GuauMiauError::IoError)?;
    toml::from_str(&content).map_err(|e| {
        GuauMiauError::ConfigError(format!("{}: {}", config_path.display(), e))
    })
}
