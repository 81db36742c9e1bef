//! Icon reference resolution following the freedesktop icon theme lookup.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];
const FALLBACK_THEME: &str = "hicolor";

/// One step of the icon fallback chain.
pub trait IconStrategy {
    fn lookup(&self, icon: &str, size: u32) -> Option<PathBuf>;
}

/// Tries each strategy in order and returns the first hit.
pub struct IconResolver {
    strategies: Vec<Box<dyn IconStrategy>>,
}

impl IconResolver {
    /// Standard chain: absolute path, themed lookup, unthemed lookup, raw path.
    pub fn new(theme: &str, icon_dirs: &[PathBuf], pixmap_dirs: &[PathBuf]) -> Self {
        let mut unthemed = icon_dirs.to_vec();
        unthemed.extend(pixmap_dirs.iter().cloned());

        Self::with_strategies(vec![
            Box::new(AbsolutePath),
            Box::new(ThemeLookup::new(theme, icon_dirs)),
            Box::new(Unthemed { dirs: unthemed }),
            Box::new(RawPath),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn IconStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn resolve(&self, icon: &str, size: u32) -> Option<PathBuf> {
        if icon.is_empty() {
            return None;
        }
        let found = self.strategies.iter().find_map(|s| s.lookup(icon, size));
        debug!("Icon {:?} -> {:?}", icon, found);
        found
    }
}

pub struct AbsolutePath;

impl IconStrategy for AbsolutePath {
    fn lookup(&self, icon: &str, _size: u32) -> Option<PathBuf> {
        let path = Path::new(icon);
        (path.is_absolute() && path.is_file()).then(|| path.to_path_buf())
    }
}

/// A reference that happens to name an existing file as written. Relative
/// references are made absolute against the current directory.
pub struct RawPath;

impl IconStrategy for RawPath {
    fn lookup(&self, icon: &str, _size: u32) -> Option<PathBuf> {
        let path = Path::new(icon);
        if !path.is_file() {
            return None;
        }
        fs::canonicalize(path).ok()
    }
}

/// `<dir>/<name>.<ext>` outside of any theme, e.g. `/usr/share/pixmaps`.
pub struct Unthemed {
    pub dirs: Vec<PathBuf>,
}

impl IconStrategy for Unthemed {
    fn lookup(&self, icon: &str, _size: u32) -> Option<PathBuf> {
        let name = icon_name(icon)?;
        self.dirs.iter().find_map(|dir| find_file(dir, name))
    }
}

/// Searches the active theme, its parents, then hicolor.
pub struct ThemeLookup {
    themes: Vec<Theme>,
}

impl ThemeLookup {
    pub fn new(active: &str, icon_dirs: &[PathBuf]) -> Self {
        let mut themes = Vec::new();
        let mut visited = HashSet::new();
        collect_themes(active, icon_dirs, &mut visited, &mut themes);
        collect_themes(FALLBACK_THEME, icon_dirs, &mut visited, &mut themes);
        debug!(
            "Icon theme chain: {:?}",
            themes.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );
        Self { themes }
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name.as_str())
    }
}

impl IconStrategy for ThemeLookup {
    fn lookup(&self, icon: &str, size: u32) -> Option<PathBuf> {
        let name = icon_name(icon)?;
        self.themes.iter().find_map(|theme| theme.lookup(name, size))
    }
}

/// Depth-first walk over `Inherits`, each theme visited once.
fn collect_themes(name: &str, icon_dirs: &[PathBuf], visited: &mut HashSet<String>, out: &mut Vec<Theme>) {
    if !visited.insert(name.to_string()) {
        return;
    }
    let Some(theme) = Theme::load(name, icon_dirs) else {
        debug!("Icon theme {:?} not found", name);
        return;
    };
    let parents = theme.inherits.clone();
    out.push(theme);
    for parent in parents {
        collect_themes(&parent, icon_dirs, visited, out);
    }
}

/// Symbolic name without a stray image extension; absolute paths have none.
fn icon_name(icon: &str) -> Option<&str> {
    if Path::new(icon).is_absolute() {
        return None;
    }
    for ext in EXTENSIONS {
        if let Some(stem) = icon.strip_suffix(ext).and_then(|s| s.strip_suffix('.')) {
            return Some(stem);
        }
    }
    Some(icon)
}

fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|p| p.is_file())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirKind {
    Fixed,
    Scalable,
    Threshold,
}

#[derive(Debug, Clone)]
struct ThemeDir {
    path: String,
    size: u32,
    min_size: u32,
    max_size: u32,
    threshold: u32,
    scale: u32,
    kind: DirKind,
}

impl ThemeDir {
    fn matches(&self, size: u32) -> bool {
        if self.scale != 1 {
            return false;
        }
        match self.kind {
            DirKind::Fixed => self.size == size,
            DirKind::Scalable => self.min_size <= size && size <= self.max_size,
            DirKind::Threshold => {
                self.size.saturating_sub(self.threshold) <= size && size <= self.size.saturating_add(self.threshold)
            }
        }
    }

    fn distance(&self, size: u32) -> u32 {
        let (low, high) = match self.kind {
            DirKind::Fixed => (self.size, self.size),
            DirKind::Scalable => (self.min_size, self.max_size),
            DirKind::Threshold => (self.size.saturating_sub(self.threshold), self.size.saturating_add(self.threshold)),
        };
        if size < low {
            low - size
        } else {
            size.saturating_sub(high)
        }
    }
}

#[derive(Debug)]
struct Theme {
    name: String,
    roots: Vec<PathBuf>,
    dirs: Vec<ThemeDir>,
    inherits: Vec<String>,
}

impl Theme {
    /// A theme exists if some icon dir holds `<name>/index.theme`; every
    /// icon dir holding `<name>/` contributes files.
    fn load(name: &str, icon_dirs: &[PathBuf]) -> Option<Self> {
        let roots: Vec<PathBuf> = icon_dirs
            .iter()
            .map(|d| d.join(name))
            .filter(|p| p.is_dir())
            .collect();
        let content = roots
            .iter()
            .find_map(|r| fs::read_to_string(r.join("index.theme")).ok())?;
        let (dirs, inherits) = parse_index_theme(&content);
        Some(Self {
            name: name.to_string(),
            roots,
            dirs,
            inherits,
        })
    }

    fn lookup(&self, name: &str, size: u32) -> Option<PathBuf> {
        for dir in self.dirs.iter().filter(|d| d.matches(size)) {
            for root in &self.roots {
                if let Some(path) = find_file(&root.join(&dir.path), name) {
                    return Some(path);
                }
            }
        }

        let mut best: Option<(u32, PathBuf)> = None;
        for dir in &self.dirs {
            let distance = dir.distance(size);
            if best.as_ref().is_some_and(|(d, _)| *d <= distance) {
                continue;
            }
            for root in &self.roots {
                if let Some(path) = find_file(&root.join(&dir.path), name) {
                    best = Some((distance, path));
                    break;
                }
            }
        }
        best.map(|(_, path)| path)
    }
}

/// Returns the sub-directories and `Inherits` list of an `index.theme`.
fn parse_index_theme(content: &str) -> (Vec<ThemeDir>, Vec<String>) {
    let mut sections: HashMap<&str, HashMap<&str, &str>> = HashMap::new();
    let mut current = "";

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = &line[1..line.len() - 1];
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            sections.entry(current).or_default().insert(k.trim(), v.trim());
        }
    }

    let Some(header) = sections.get("Icon Theme") else {
        return (Vec::new(), Vec::new());
    };
    let list = |key: &str| -> Vec<String> {
        header
            .get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    };
    let inherits = list("Inherits");
    let mut names = list("Directories");
    names.extend(list("ScaledDirectories"));

    let mut dirs = Vec::new();
    for path in names {
        let Some(section) = sections.get(path.as_str()) else { continue };
        let num = |key: &str| section.get(key).and_then(|v| v.parse::<u32>().ok());
        // Size is mandatory for every listed directory.
        let Some(size) = num("Size") else { continue };
        let kind = match section.get("Type").copied() {
            Some("Fixed") => DirKind::Fixed,
            Some("Scalable") => DirKind::Scalable,
            _ => DirKind::Threshold,
        };
        dirs.push(ThemeDir {
            size,
            min_size: num("MinSize").unwrap_or(size),
            max_size: num("MaxSize").unwrap_or(size),
            threshold: num("Threshold").unwrap_or(2),
            scale: num("Scale").unwrap_or(1),
            kind,
            path,
        });
    }
    (dirs, inherits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const HICOLOR: &str = "[Icon Theme]\nName=Hicolor\nDirectories=48x48/apps,scalable/apps,16x16/apps\n\n\
        [48x48/apps]\nSize=48\nType=Threshold\n\n\
        [scalable/apps]\nSize=128\nMinSize=8\nMaxSize=512\nType=Scalable\n\n\
        [16x16/apps]\nSize=16\nType=Fixed\n";

    #[test]
    fn test_parse_index_theme() {
        let (dirs, inherits) = parse_index_theme(
            "[Icon Theme]\nInherits=Adwaita, hicolor\nDirectories=a,b,missing\n[a]\nSize=32\nType=Fixed\n[b]\nSize=64\nScale=2\n",
        );
        assert_eq!(inherits, vec!["Adwaita", "hicolor"]);
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0].kind, DirKind::Fixed);
        assert_eq!(dirs[1].kind, DirKind::Threshold);
        assert_eq!(dirs[1].scale, 2);
    }

    #[test]
    fn test_dir_size_matching() {
        let dir = |kind, size, min, max| ThemeDir {
            path: String::new(),
            size,
            min_size: min,
            max_size: max,
            threshold: 2,
            scale: 1,
            kind,
        };
        let fixed = dir(DirKind::Fixed, 48, 48, 48);
        assert!(fixed.matches(48));
        assert!(!fixed.matches(47));
        assert_eq!(fixed.distance(32), 16);

        let scalable = dir(DirKind::Scalable, 128, 16, 256);
        assert!(scalable.matches(48));
        assert_eq!(scalable.distance(512), 256);
        assert_eq!(scalable.distance(8), 8);

        let threshold = dir(DirKind::Threshold, 48, 48, 48);
        assert!(threshold.matches(46));
        assert!(threshold.matches(50));
        assert!(!threshold.matches(51));
        assert_eq!(threshold.distance(64), 14);
    }

    #[test]
    fn test_icon_name_strips_extension() {
        assert_eq!(icon_name("firefox"), Some("firefox"));
        assert_eq!(icon_name("firefox.png"), Some("firefox"));
        assert_eq!(icon_name("org.gnome.Nautilus"), Some("org.gnome.Nautilus"));
        assert_eq!(icon_name("/abs/firefox.png"), None);
    }

    #[test]
    fn test_absolute_path_wins_without_theme_lookup() {
        let root = tempdir().unwrap();
        let icon = root.path().join("custom.png");
        write(&icon, "png");

        let resolver = IconResolver::new("hicolor", &[root.path().join("icons")], &[]);
        assert_eq!(resolver.resolve(icon.to_str().unwrap(), 48), Some(icon));
    }

    #[test]
    fn test_theme_prefers_exact_size_then_closest() {
        let root = tempdir().unwrap();
        let icons = root.path().join("icons");
        write(&icons.join("hicolor/index.theme"), HICOLOR);
        write(&icons.join("hicolor/16x16/apps/term.png"), "");
        write(&icons.join("hicolor/48x48/apps/term.png"), "");
        write(&icons.join("hicolor/16x16/apps/small.png"), "");

        let resolver = IconResolver::new("hicolor", &[icons.clone()], &[]);
        assert_eq!(resolver.resolve("term", 48), Some(icons.join("hicolor/48x48/apps/term.png")));
        assert_eq!(resolver.resolve("small", 48), Some(icons.join("hicolor/16x16/apps/small.png")));
        assert_eq!(resolver.resolve("nothing", 48), None);
    }

    #[test]
    fn test_theme_chain_follows_inherits_then_hicolor() {
        let root = tempdir().unwrap();
        let icons = root.path().join("icons");
        write(
            &icons.join("Papirus/index.theme"),
            "[Icon Theme]\nInherits=Breeze\nDirectories=48x48/apps\n[48x48/apps]\nSize=48\nType=Fixed\n",
        );
        write(
            &icons.join("Breeze/index.theme"),
            "[Icon Theme]\nDirectories=apps/48\n[apps/48]\nSize=48\nType=Fixed\n",
        );
        write(&icons.join("hicolor/index.theme"), HICOLOR);
        write(&icons.join("Papirus/48x48/apps/firefox.svg"), "");
        write(&icons.join("Breeze/apps/48/kate.svg"), "");
        write(&icons.join("hicolor/48x48/apps/firefox.png"), "");
        write(&icons.join("hicolor/scalable/apps/gimp.svg"), "");

        let lookup = ThemeLookup::new("Papirus", &[icons.clone()]);
        assert_eq!(lookup.theme_names().collect::<Vec<_>>(), vec!["Papirus", "Breeze", "hicolor"]);

        let resolver = IconResolver::new("Papirus", &[icons.clone()], &[]);
        assert_eq!(resolver.resolve("firefox", 48), Some(icons.join("Papirus/48x48/apps/firefox.svg")));
        assert_eq!(resolver.resolve("kate", 48), Some(icons.join("Breeze/apps/48/kate.svg")));
        assert_eq!(resolver.resolve("gimp", 48), Some(icons.join("hicolor/scalable/apps/gimp.svg")));
    }

    #[test]
    fn test_unthemed_fallback_to_pixmaps() {
        let root = tempdir().unwrap();
        let pixmaps = root.path().join("pixmaps");
        write(&pixmaps.join("legacy.xpm"), "");

        let resolver = IconResolver::new("hicolor", &[root.path().join("icons")], &[pixmaps.clone()]);
        assert_eq!(resolver.resolve("legacy", 48), Some(pixmaps.join("legacy.xpm")));
        assert_eq!(resolver.resolve("legacy.xpm", 48), Some(pixmaps.join("legacy.xpm")));
    }

    #[test]
    fn test_oversized_theme_dir_does_not_overflow() {
        let root = tempdir().unwrap();
        let icons = root.path().join("icons");
        write(
            &icons.join("hicolor/index.theme"),
            "[Icon Theme]\nDirectories=big,apps\n[big]\nSize=4294967295\nType=Threshold\n[apps]\nSize=16\nType=Fixed\n",
        );
        write(&icons.join("hicolor/apps/firefox.png"), "");

        let lookup = ThemeLookup::new("hicolor", &[icons.clone()]);
        assert_eq!(lookup.lookup("firefox", 48), Some(icons.join("hicolor/apps/firefox.png")));
        assert_eq!(lookup.lookup("missing", 48), None);
    }

    #[test]
    fn test_raw_relative_path_is_made_absolute() {
        // Tests run from the package root.
        let resolver = IconResolver::new("hicolor", &[], &[]);
        let found = resolver.resolve("Cargo.toml", 48).unwrap();
        assert!(found.is_absolute());
        assert!(found.ends_with("Cargo.toml"));
        assert!(found.is_file());
    }

    #[test]
    fn test_empty_reference_is_not_found() {
        let resolver = IconResolver::with_strategies(vec![Box::new(RawPath)]);
        assert_eq!(resolver.resolve("", 48), None);
    }
}
