use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A descriptor file that could not be turned into a record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path:?} has no [Desktop Entry] group")]
    NoDesktopEntry { path: PathBuf },
    #[error("{path:?} line {line}: not a key=value pair")]
    Malformed { path: PathBuf, line: usize },
    #[error("{path:?} is missing required key {key}")]
    MissingKey { path: PathBuf, key: &'static str },
    #[error("{path:?} is of type {kind}, not Application")]
    NotApplication { path: PathBuf, kind: String },
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("none of the {0} application directories could be read")]
    NoDirectories(usize),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("nothing to launch: empty command")]
    EmptyCommand,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
