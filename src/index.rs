use crate::cache::IndexCache;
use crate::config::Config;
use crate::error::LocateError;
use crate::icons::IconResolver;
use crate::model::ApplicationIndex;
use crate::sources::desktop::{parse_desktop_file, Locale};
use crate::sources::{locate_descriptors, xdg, Descriptor};
use log::{debug, info, warn};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};

/// Turns located descriptors into an [`ApplicationIndex`].
pub struct IndexBuilder {
    resolver: IconResolver,
    icon_size: u32,
    locale: Option<Locale>,
}

impl IndexBuilder {
    pub fn new(resolver: IconResolver, icon_size: u32) -> Self {
        Self {
            resolver,
            icon_size,
            locale: Locale::from_env(),
        }
    }

    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// Builder wired to the configured icon theme and directories.
    pub fn from_config(config: &Config, data_dirs: &[PathBuf]) -> Self {
        let theme = config
            .general
            .icon_theme
            .clone()
            .or_else(xdg::gtk_icon_theme)
            .unwrap_or_else(|| "hicolor".to_string());
        let icon_dirs = xdg::icon_dirs(data_dirs, &config.paths);
        let pixmap_dirs = xdg::pixmap_dirs(data_dirs);
        debug!("Icon theme {:?}, icon dirs {:?}", theme, icon_dirs);

        Self::new(IconResolver::new(&theme, &icon_dirs, &pixmap_dirs), config.general.icon_size)
    }

    /// Later descriptors overwrite earlier ones with the same name, so the
    /// lowest-priority directory is processed first and the highest last.
    /// Within a directory, files keep their locator order.
    pub fn build(&self, descriptors: &[Descriptor]) -> ApplicationIndex {
        let mut ordered: Vec<&Descriptor> = descriptors.iter().collect();
        ordered.sort_by_key(|d| Reverse(d.rank));

        let mut index = ApplicationIndex::new();
        let mut skipped = 0;

        for descriptor in ordered {
            let mut record = match parse_desktop_file(&descriptor.path, self.locale.as_ref()) {
                Ok(record) => record,
                Err(err) => {
                    debug!("Skipping descriptor: {}", err);
                    skipped += 1;
                    continue;
                }
            };
            if !record.visible {
                debug!("Skipping hidden application {:?}", record.name);
                continue;
            }
            if let Some(icon_ref) = &record.icon_ref {
                record.icon = self.resolver.resolve(icon_ref, self.icon_size);
            }
            if index.insert(record) {
                debug!("Overrode duplicate from {:?}", descriptor.path);
            }
        }

        info!(
            "Indexed {} applications from {} descriptors ({} unparsable)",
            index.len(),
            descriptors.len(),
            skipped
        );
        index
    }

    /// Locates and builds in one step.
    pub fn try_build_from_dirs<P: AsRef<Path>>(&self, bases: &[P]) -> Result<ApplicationIndex, LocateError> {
        let descriptors = locate_descriptors(bases)?;
        Ok(self.build(&descriptors))
    }

    /// Like [`Self::try_build_from_dirs`], but an enumeration failure gives
    /// an empty index.
    pub fn build_from_dirs<P: AsRef<Path>>(&self, bases: &[P]) -> ApplicationIndex {
        self.try_build_from_dirs(bases).unwrap_or_else(|err| {
            warn!("{}; starting with an empty index", err);
            ApplicationIndex::new()
        })
    }
}

/// Startup entry point: reuse the cache if it is valid, otherwise scan and
/// refresh it.
pub fn build_or_load_index(config: &Config, cache: Option<&IndexCache>) -> ApplicationIndex {
    if let Some(index) = cache.and_then(IndexCache::load) {
        info!("Loaded {} applications from cache", index.len());
        return index;
    }

    let data_dirs = xdg::data_dirs(&config.paths);
    rebuild_index(config, &data_dirs, cache)
}

/// Scans `data_dirs` and writes the result to `cache`. A failed write is
/// only logged. When the directories cannot be enumerated the empty
/// fallback index is returned and the cache is left untouched.
pub fn rebuild_index(config: &Config, data_dirs: &[PathBuf], cache: Option<&IndexCache>) -> ApplicationIndex {
    let builder = IndexBuilder::from_config(config, data_dirs);
    let index = match builder.try_build_from_dirs(data_dirs) {
        Ok(index) => index,
        Err(err) => {
            warn!("{}; starting with an empty index, cache not updated", err);
            return ApplicationIndex::new();
        }
    };

    if let Some(cache) = cache {
        if let Err(err) = cache.store(&index) {
            warn!("Could not write index cache: {}", err);
        }
    }
    index
}
