use crate::error::ParseError;
use crate::model::ApplicationRecord;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

const DESKTOP_ENTRY_GROUP: &str = "[Desktop Entry]";

/// Message locale used to pick `Name[..]` translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    lang: String,
    country: Option<String>,
    modifier: Option<String>,
}

impl Locale {
    /// Reads `LC_ALL`, `LC_MESSAGES` and `LANG`, first non-empty wins.
    pub fn from_env() -> Option<Self> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|v| !v.is_empty())
            .and_then(|v| Self::parse(&v))
    }

    /// Parses `lang_COUNTRY.ENCODING@MODIFIER`; `C` and `POSIX` have no
    /// translations and give `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let (rest, modifier) = match value.split_once('@') {
            Some((rest, m)) => (rest, Some(m.to_string())),
            None => (value, None),
        };
        let rest = rest.split('.').next().unwrap_or(rest);
        let (lang, country) = match rest.split_once('_') {
            Some((l, c)) => (l, Some(c.to_string())),
            None => (rest, None),
        };
        if lang.is_empty() || lang == "C" || lang == "POSIX" {
            return None;
        }
        Some(Self {
            lang: lang.to_string(),
            country,
            modifier,
        })
    }

    /// Locale suffixes in lookup order.
    fn candidates(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(4);
        if let (Some(c), Some(m)) = (&self.country, &self.modifier) {
            out.push(format!("{}_{}@{}", self.lang, c, m));
        }
        if let Some(c) = &self.country {
            out.push(format!("{}_{}", self.lang, c));
        }
        if let Some(m) = &self.modifier {
            out.push(format!("{}@{}", self.lang, m));
        }
        out.push(self.lang.clone());
        out
    }
}

pub fn parse_desktop_file(path: &Path, locale: Option<&Locale>) -> Result<ApplicationRecord, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut record = parse_desktop_entry(&content, path, locale)?;
    record.source = Some(path.to_path_buf());
    Ok(record)
}

/// Parses descriptor text. `path` is only used in errors.
pub fn parse_desktop_entry(content: &str, path: &Path, locale: Option<&Locale>) -> Result<ApplicationRecord, ParseError> {
    let mut keys: HashMap<&str, &str> = HashMap::new();
    let mut seen_group = false;
    let mut in_desktop_entry = false;

    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            in_desktop_entry = line == DESKTOP_ENTRY_GROUP;
            seen_group |= in_desktop_entry;
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ParseError::Malformed {
                path: path.to_path_buf(),
                line: n + 1,
            });
        };

        if in_desktop_entry {
            keys.insert(key.trim(), value.trim());
        }
    }

    if !seen_group {
        return Err(ParseError::NoDesktopEntry { path: path.to_path_buf() });
    }

    if let Some(kind) = keys.get("Type") {
        if *kind != "Application" {
            return Err(ParseError::NotApplication {
                path: path.to_path_buf(),
                kind: kind.to_string(),
            });
        }
    }

    let name = localized(&keys, "Name", locale)
        .map(unescape)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ParseError::MissingKey { path: path.to_path_buf(), key: "Name" })?;
    let exec = keys
        .get("Exec")
        .map(|e| unescape(e))
        .ok_or_else(|| ParseError::MissingKey { path: path.to_path_buf(), key: "Exec" })?;

    let mut record = ApplicationRecord::new(name.trim().to_string(), exec);
    record.icon_ref = keys
        .get("Icon")
        .map(|i| unescape(i))
        .filter(|i| !i.is_empty());
    record.visible = !(flag(&keys, "NoDisplay") || flag(&keys, "Hidden"));
    Ok(record)
}

fn localized<'a>(keys: &HashMap<&str, &'a str>, key: &str, locale: Option<&Locale>) -> Option<&'a str> {
    if let Some(locale) = locale {
        for suffix in locale.candidates() {
            if let Some(value) = keys.get(format!("{}[{}]", key, suffix).as_str()).copied() {
                return Some(value);
            }
        }
    }
    keys.get(key).copied()
}

fn flag(keys: &HashMap<&str, &str>, key: &str) -> bool {
    matches!(keys.get(key).copied(), Some("true") | Some("1"))
}

/// Expands the `\s \n \t \r \\` escapes of desktop-entry string values.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
