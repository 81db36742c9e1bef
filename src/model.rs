use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub name: String,             // Display name, unique within the index
    pub exec: String,             // Raw Exec template, may hold %-field codes
    pub icon_ref: Option<String>, // Icon name/path as written in the descriptor
    pub icon: Option<PathBuf>,    // Resolved icon file
    pub visible: bool,
    pub source: Option<PathBuf>,  // Descriptor the record was parsed from
}

impl ApplicationRecord {
    pub fn new(name: String, exec: String) -> Self {
        Self {
            name,
            exec,
            icon_ref: None,
            icon: None,
            visible: true,
            source: None,
        }
    }
}

/// Deduplicated, name-sorted set of launchable applications.
///
/// Names are ordered byte-wise (`Ord for String`), which is also the order
/// the cache file is written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationIndex {
    entries: BTreeMap<String, ApplicationRecord>,
}

impl ApplicationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record`, replacing any entry with the same name.
    /// Hidden records are dropped. Returns true if an entry was replaced.
    pub fn insert(&mut self, record: ApplicationRecord) -> bool {
        if !record.visible {
            return false;
        }
        self.entries.insert(record.name.clone(), record).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ApplicationRecord> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + Clone {
        self.entries.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &ApplicationRecord> + Clone {
        self.entries.values()
    }
}

impl FromIterator<ApplicationRecord> for ApplicationIndex {
    fn from_iter<I: IntoIterator<Item = ApplicationRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, exec: &str) -> ApplicationRecord {
        ApplicationRecord::new(name.to_string(), exec.to_string())
    }

    #[test]
    fn test_insert_overwrites_same_name() {
        let mut index = ApplicationIndex::new();
        assert!(!index.insert(record("Files", "nautilus")));
        assert!(index.insert(record("Files", "thunar")));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Files").unwrap().exec, "thunar");
    }

    #[test]
    fn test_hidden_records_are_not_inserted() {
        let mut index = ApplicationIndex::new();
        let mut hidden = record("Daemon", "daemon");
        hidden.visible = false;
        index.insert(hidden);
        assert!(index.is_empty());
    }

    #[test]
    fn test_names_are_sorted() {
        let index: ApplicationIndex = ["zathura", "Firefox", "Files", "alacritty"]
            .into_iter()
            .map(|n| record(n, n))
            .collect();
        let names: Vec<&str> = index.names().collect();
        assert_eq!(names, vec!["Files", "Firefox", "alacritty", "zathura"]);
    }
}
