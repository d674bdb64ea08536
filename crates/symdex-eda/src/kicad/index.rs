use rayon::prelude::*;
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;

use super::inherit::{ResolveStats, resolve_inheritance};
use super::library::{KicadSymbolLibrary, LibrarySource, ScanStats};
use super::scanner::ScanOptions;
use crate::SymbolEntry;

/// Totals across every library merged into an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    pub libraries: usize,
    pub scan: ScanStats,
    /// Entries replaced by a later library defining the same identifier.
    pub replaced: usize,
}

/// Merges per-library results into one identifier-keyed index.
///
/// Libraries must be added in enumeration order: a later library's entry
/// replaces an earlier one wholesale.
#[derive(Debug, Default)]
pub struct SymbolIndexBuilder {
    entries: BTreeMap<String, SymbolEntry>,
    stats: IndexStats,
}

impl SymbolIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_library(&mut self, library: KicadSymbolLibrary) -> &mut Self {
        self.stats.libraries += 1;
        self.stats.scan += library.stats();
        let name = library.name().to_string();

        for entry in library.into_symbols() {
            if let Some(previous) = self.entries.insert(entry.id.clone(), entry) {
                log::debug!("{name}: replaces earlier definition of '{}'", previous.id);
                self.stats.replaced += 1;
            }
        }
        self
    }

    pub fn build(self) -> SymbolIndex {
        SymbolIndex {
            entries: self.entries,
            stats: self.stats,
        }
    }
}

/// Parse `sources` in parallel, then merge them sequentially in slice order.
pub fn build_index(sources: Vec<LibrarySource>, options: ScanOptions) -> SymbolIndex {
    let libraries: Vec<KicadSymbolLibrary> = sources
        .into_par_iter()
        .map(|source| KicadSymbolLibrary::parse(source, options))
        .collect();

    let mut builder = SymbolIndexBuilder::new();
    for library in libraries {
        builder.add_library(library);
    }
    builder.build()
}

/// Identifier-keyed symbol index.
///
/// Serializes as a plain JSON object `{ "<id>": <entry>, ... }` in identifier order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolIndex {
    entries: BTreeMap<String, SymbolEntry>,
    stats: IndexStats,
}

impl SymbolIndex {
    pub fn get(&self, id: &str) -> Option<&SymbolEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Fill empty pins and unset bounding boxes from each entry's base.
    ///
    /// Runs once per entry; see [`resolve_inheritance`].
    pub fn resolve_inheritance(&mut self) -> ResolveStats {
        let stats = resolve_inheritance(&mut self.entries);
        log::debug!(
            "Inheritance: {} pin lists, {} bounding boxes inherited, {} missing bases",
            stats.inherited_pins,
            stats.inherited_bbox,
            stats.missing_base
        );
        stats
    }
}

impl Serialize for SymbolIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}
