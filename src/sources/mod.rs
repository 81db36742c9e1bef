use crate::error::LocateError;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod desktop;
pub mod xdg;

/// A candidate descriptor file and the priority of the base directory it
/// was found under (0 is the highest priority).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub path: PathBuf,
    pub rank: usize,
}

/// Lists `<base>/applications/*.desktop` for every base directory, in base
/// priority order and then by file name. Missing directories are skipped;
/// an error is returned only if no `applications` directory was readable.
pub fn locate_descriptors<P: AsRef<Path>>(bases: &[P]) -> Result<Vec<Descriptor>, LocateError> {
    let mut descriptors = Vec::new();
    let mut readable = 0;

    for (rank, base) in bases.iter().enumerate() {
        let dir = base.as_ref().join("applications");
        if !dir.is_dir() {
            continue;
        }

        debug!("Scanning desktop files in {:?}", dir);
        let mut ok = true;
        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        ok = false;
                    }
                    debug!("Skipping unreadable entry in {:?}: {}", dir, err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|s| s.to_str()) != Some("desktop") {
                continue;
            }
            descriptors.push(Descriptor {
                path: entry.into_path(),
                rank,
            });
        }

        if ok {
            readable += 1;
        }
    }

    if readable == 0 {
        return Err(LocateError::NoDirectories(bases.len()));
    }
    Ok(descriptors)
}
