use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const SYMBOL_LIBRARY_EXTENSION: &str = "kicad_sym";

/// Allow-list of library categories, matched against the file stem
/// (`Device.kicad_sym` is category `Device`). An empty list admits everything.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    allowed: BTreeSet<String>,
}

impl CategoryFilter {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, category: &str) -> bool {
        self.allowed.is_empty() || self.allowed.contains(category)
    }
}

/// Symbol libraries directly inside `dir` that pass `filter`, sorted by path.
///
/// The walk is best-effort: if `dir` cannot be read the result is empty, and
/// unreadable entries are skipped with a warning.
pub fn find_symbol_libraries(dir: &Path, filter: &CategoryFilter) -> Vec<PathBuf> {
    let mut found = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // Failing on the root itself means nothing was listed.
                if err.depth() == 0 {
                    log::warn!("Cannot read {}: {err}", dir.display());
                    return Vec::new();
                }
                log::warn!("Skipping unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(SYMBOL_LIBRARY_EXTENSION)
        {
            continue;
        }

        let Some(category) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if filter.allows(category) {
            log::debug!("Including {}", path.display());
            found.push(path.to_path_buf());
        } else {
            log::trace!("Category {category} not allowed");
        }
    }

    found
}
