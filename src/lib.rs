//! appdex: application index for desktop launchers.
//!
//! Scans freedesktop `.desktop` files, resolves their icons through the
//! icon theme, keeps a deduplicated name-sorted index cached on disk, and
//! launches entries as detached processes. Front ends use:
//! - [`build_or_load_index`] once at startup
//! - [`filter`] (or a configured [`Filter`]) on every query change
//! - [`resolve_launch_command`] and [`launch`] when an entry is picked

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod icons;
pub mod index;
pub mod matcher;
pub mod model;
pub mod sources;

pub use cache::IndexCache;
pub use config::{load_config, Config};
pub use error::{CacheError, ConfigError, LaunchError, LocateError, ParseError};
pub use executor::{launch, resolve_launch_command};
pub use icons::IconResolver;
pub use index::{build_or_load_index, rebuild_index, IndexBuilder};
pub use matcher::{filter, Filter};
pub use model::{ApplicationIndex, ApplicationRecord};
