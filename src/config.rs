use serde::Deserialize;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use std::fs;
use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,
    #[serde(default)]
    pub icon_theme: Option<String>,
}

fn default_icon_size() -> u32 { 48 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            icon_size: default_icon_size(),
            icon_theme: None,
        }
    }
}

/// Overrides for where descriptors and icons are looked up.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PathsConfig {
    /// Replaces the XDG data directories when non-empty.
    #[serde(default)]
    pub data_dirs: Vec<PathBuf>,
    /// Appended after the XDG data directories, lowest priority.
    #[serde(default)]
    pub extra_data_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub icon_dirs: Vec<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub check_mtime: bool,
}

fn default_true() -> bool { true }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            check_mtime: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Substring,
    Fuzzy,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FilterConfig {
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "appdex", "appdex")
}

pub fn default_config_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

/// Loads the config at `path`, or the default location when `None`.
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path(),
    };

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path,
        source,
    })
}
