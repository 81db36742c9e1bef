use crate::config::{project_dirs, CacheConfig};
use crate::error::CacheError;
use crate::model::{ApplicationIndex, ApplicationRecord};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// On-disk form of one record: `{"exec": "...", "icon": "..." | null}`.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CachedApp {
    exec: String,
    icon: Option<String>,
}

/// JSON file holding a previously built index.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
    watch_dirs: Vec<PathBuf>,
}

pub fn default_cache_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.cache_dir().join("index.json"),
        None => PathBuf::from("index.json"),
    }
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            watch_dirs: Vec::new(),
        }
    }

    /// Cache described by the `[cache]` config section; `None` when disabled.
    /// With `check_mtime`, the `applications` directory of each data dir is
    /// watched for changes.
    pub fn from_config(config: &CacheConfig, data_dirs: &[PathBuf]) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let cache = Self::new(config.path.clone().unwrap_or_else(default_cache_path));
        if config.check_mtime {
            let dirs = data_dirs.iter().map(|d| d.join("applications")).collect();
            Some(cache.with_staleness_check(dirs))
        } else {
            Some(cache)
        }
    }

    /// Treat the cache as absent when any of `dirs` changed after it was written.
    pub fn with_staleness_check(mut self, dirs: Vec<PathBuf>) -> Self {
        self.watch_dirs = dirs;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached index, or `None` if the file is missing, stale or
    /// not a valid cache.
    pub fn load(&self) -> Option<ApplicationIndex> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                debug!("No usable cache at {:?}: {}", self.path, err);
                return None;
            }
        };

        let apps: BTreeMap<String, CachedApp> = match serde_json::from_str(&content) {
            Ok(apps) => apps,
            Err(err) => {
                info!("Ignoring corrupt cache {:?}: {}", self.path, err);
                return None;
            }
        };
        if apps.keys().any(|name| name.trim().is_empty()) {
            info!("Ignoring cache {:?}: empty application name", self.path);
            return None;
        }

        if self.is_stale() {
            info!("Cache {:?} is older than the application directories", self.path);
            return None;
        }

        Some(
            apps.into_iter()
                .map(|(name, app)| {
                    let mut record = ApplicationRecord::new(name, app.exec);
                    record.icon = app.icon.map(PathBuf::from);
                    record
                })
                .collect(),
        )
    }

    /// Writes `index` to a sibling file and renames it over the cache.
    pub fn store(&self, index: &ApplicationIndex) -> Result<(), CacheError> {
        let apps: BTreeMap<&str, CachedApp> = index
            .records()
            .map(|r| {
                (
                    r.name.as_str(),
                    CachedApp {
                        exec: r.exec.clone(),
                        icon: r.icon.as_deref().and_then(|icon| utf8_icon(&r.name, icon)),
                    },
                )
            })
            .collect();
        let content = serde_json::to_string_pretty(&apps)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|source| self.io_error(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;

        info!("Wrote {} applications to {:?}", index.len(), self.path);
        Ok(())
    }

    /// Removes the cache file. Returns false if there was none.
    pub fn clear(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn is_stale(&self) -> bool {
        if self.watch_dirs.is_empty() {
            return false;
        }
        let Some(written) = mtime(&self.path) else {
            return true;
        };
        self.watch_dirs
            .iter()
            .filter_map(|dir| mtime(dir))
            .any(|changed| changed > written)
    }

    fn io_error(&self, source: io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// The cache schema stores icons as strings; paths that are not UTF-8 are
/// dropped so the rest of the index can still be written.
fn utf8_icon(name: &str, icon: &Path) -> Option<String> {
    let icon_str = icon.to_str().map(String::from);
    if icon_str.is_none() {
        warn!("Not caching non UTF-8 icon path {:?} of {:?}", icon, name);
    }
    icon_str
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
