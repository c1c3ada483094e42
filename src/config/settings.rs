//! Configuration settings management
//!
//! This module handles loading configuration from the optional config
//! file and environment variables, and validation.

use crate::auth::AccountKind;
use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    /// Directory manifests are written to
    pub output_dir: PathBuf,
    /// Account whose key signs the download (locD) SAS
    pub download_signing_account: AccountKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            output_dir: PathBuf::from("."),
            download_signing_account: AccountKind::Secondary,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(StageError::config("Output directory cannot be empty"));
        }

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        // XDG layout on Linux and macOS, platform config directory elsewhere
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| StageError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(config_dir.join("blobstage").join("blobstage.conf"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| StageError::config("Unable to determine config directory"))?;
            Ok(config_dir.join("blobstage").join("blobstage.conf"))
        }
    }
}

/// Load configuration from multiple sources with priority order:
/// 1. Command-line flags (applied by the CLI)
/// 2. Environment variables
/// 3. Configuration file
/// 4. Default values
pub async fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let config_path = Config::get_config_path()?;
    if config_path.exists() {
        config = load_from_file(&config_path).await?;
    }

    load_from_env(&mut config, |name| std::env::var(name).ok())?;

    config.validate()?;
    Ok(config)
}

pub async fn load_from_file(path: &Path) -> Result<Config> {
    let contents = tokio::fs::read_to_string(path).await?;
    parse_config(&contents)
}

/// Parse config file contents, TOML first with JSON as fallback
pub fn parse_config(contents: &str) -> Result<Config> {
    match toml::from_str::<Config>(contents) {
        Ok(config) => Ok(config),
        Err(toml_err) => match serde_json::from_str::<Config>(contents) {
            Ok(config) => Ok(config),
            Err(_) => Err(toml_err.into()),
        },
    }
}

/// Apply environment overrides using `lookup`
pub fn load_from_env<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("DEBUG") {
        config.debug = value.to_lowercase() == "true" || value == "1";
    }

    if let Some(value) = lookup("BLOBSTAGE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(value);
    }

    if let Some(value) = lookup("BLOBSTAGE_DOWNLOAD_SIGNER") {
        config.download_signing_account = value.parse()?;
    }

    Ok(())
}
