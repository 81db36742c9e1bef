//! XDG base directory discovery for descriptors and icons.

use crate::config::PathsConfig;
use directories::BaseDirs;
use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Data directories in priority order, highest first.
pub fn data_dirs(paths: &PathsConfig) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if paths.data_dirs.is_empty() {
        if let Some(base_dirs) = BaseDirs::new() {
            dirs.push(base_dirs.data_dir().to_path_buf());
        }
        dirs.extend(split_data_dirs(env::var("XDG_DATA_DIRS").ok().as_deref()));
    } else {
        dirs.extend(paths.data_dirs.iter().cloned());
    }
    dirs.extend(paths.extra_data_dirs.iter().cloned());

    dedup(dirs)
}

/// Parses an `XDG_DATA_DIRS` value. Relative entries are invalid per the
/// basedir spec and are dropped; an unset or empty value gives the default.
pub fn split_data_dirs(value: Option<&str>) -> Vec<PathBuf> {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => DEFAULT_DATA_DIRS,
    };
    value
        .split(':')
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .collect()
}

/// Icon base directories: `~/.icons`, then `<data>/icons`, then configured extras.
pub fn icon_dirs(data_dirs: &[PathBuf], paths: &PathsConfig) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(base_dirs) = BaseDirs::new() {
        dirs.push(base_dirs.home_dir().join(".icons"));
    }
    dirs.extend(data_dirs.iter().map(|d| d.join("icons")));
    dirs.extend(paths.icon_dirs.iter().cloned());
    dedup(dirs)
}

pub fn pixmap_dirs(data_dirs: &[PathBuf]) -> Vec<PathBuf> {
    dedup(data_dirs.iter().map(|d| d.join("pixmaps")).collect())
}

/// Icon theme configured for GTK applications, if any.
pub fn gtk_icon_theme() -> Option<String> {
    let base_dirs = BaseDirs::new()?;
    let content = fs::read_to_string(base_dirs.config_dir().join("gtk-3.0/settings.ini")).ok()?;
    parse_gtk_icon_theme(&content)
}

fn parse_gtk_icon_theme(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != "gtk-icon-theme-name" {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn dedup(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !out.contains(&dir) {
            out.push(dir);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_dirs_default() {
        assert_eq!(
            split_data_dirs(None),
            vec![PathBuf::from("/usr/local/share"), PathBuf::from("/usr/share")]
        );
        assert_eq!(split_data_dirs(Some("  ")), split_data_dirs(None));
    }

    #[test]
    fn test_split_data_dirs_drops_relative_and_empty() {
        assert_eq!(
            split_data_dirs(Some("/opt/share::relative/share:/usr/share")),
            vec![PathBuf::from("/opt/share"), PathBuf::from("/usr/share")]
        );
    }

    #[test]
    fn test_configured_data_dirs_replace_xdg() {
        let paths = PathsConfig {
            data_dirs: vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/a")],
            extra_data_dirs: vec![PathBuf::from("/c")],
            icon_dirs: vec![],
        };
        assert_eq!(
            data_dirs(&paths),
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
    }

    #[test]
    fn test_parse_gtk_icon_theme() {
        let ini = "[Settings]\ngtk-theme-name=Adwaita\ngtk-icon-theme-name = \"Papirus-Dark\"\n";
        assert_eq!(parse_gtk_icon_theme(ini).as_deref(), Some("Papirus-Dark"));
        assert_eq!(parse_gtk_icon_theme("[Settings]\n"), None);
    }
}
