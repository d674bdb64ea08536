use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::ops::AddAssign;
use std::path::Path;

use super::scanner::{BlockScanner, ScanOptions};
use super::symbol::{SkipReason, extract_symbol};
use crate::SymbolEntry;

/// Raw text of one library file plus a label for diagnostics.
#[derive(Debug, Clone)]
pub struct LibrarySource {
    pub name: String,
    pub text: String,
}

impl LibrarySource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(path.display().to_string(), text))
    }
}

/// Per-library tallies of what the scanner and extractor saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Balanced blocks emitted by the scanner.
    pub blocks: usize,
    pub missing_identifier: usize,
    pub unterminated: usize,
    /// Blocks that replaced an earlier block with the same identifier in the same library.
    pub duplicates: usize,
}

impl ScanStats {
    pub fn skipped(&self) -> usize {
        self.missing_identifier + self.unterminated
    }

    fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::MissingIdentifier { .. } => self.missing_identifier += 1,
            SkipReason::Unterminated { .. } => self.unterminated += 1,
        }
    }
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.blocks += other.blocks;
        self.missing_identifier += other.missing_identifier;
        self.unterminated += other.unterminated;
        self.duplicates += other.duplicates;
    }
}

/// The entries of a single `.kicad_sym` file, in block order.
///
/// Duplicate identifiers within the file are collapsed so that the last block
/// wins, matching how libraries are merged into an index.
#[derive(Debug, Clone)]
pub struct KicadSymbolLibrary {
    name: String,
    entries: Vec<SymbolEntry>,
    stats: ScanStats,
}

impl KicadSymbolLibrary {
    /// Parse a KiCad symbol library from a string
    pub fn from_string(content: &str, options: ScanOptions) -> Self {
        Self::parse(LibrarySource::new("<string>", content), options)
    }

    /// Parse a KiCad symbol library from a file
    pub fn from_file(path: &Path, options: ScanOptions) -> Result<Self> {
        Ok(Self::parse(LibrarySource::from_file(path)?, options))
    }

    pub fn parse(source: LibrarySource, options: ScanOptions) -> Self {
        let mut stats = ScanStats::default();
        let mut entries: Vec<SymbolEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut scanner = BlockScanner::with_options(&source.text, options);

        for block in scanner.by_ref() {
            stats.blocks += 1;
            match extract_symbol(&block) {
                Ok(entry) => {
                    if let Some(&idx) = positions.get(&entry.id) {
                        log::debug!("{}: symbol '{}' redefined", source.name, entry.id);
                        stats.duplicates += 1;
                        entries[idx] = entry;
                    } else {
                        positions.insert(entry.id.clone(), entries.len());
                        entries.push(entry);
                    }
                }
                Err(reason) => {
                    log::debug!("{}: skipping block: {reason}", source.name);
                    stats.record_skip(&reason);
                }
            }
        }

        if let Some(offset) = scanner.unterminated_at() {
            let reason = SkipReason::Unterminated { offset };
            log::warn!("{}: {reason}", source.name);
            stats.record_skip(&reason);
        }

        log::debug!(
            "{}: {} symbols from {} blocks",
            source.name,
            entries.len(),
            stats.blocks
        );

        Self {
            name: source.name,
            entries,
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a symbol by identifier
    pub fn get_symbol(&self, id: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|s| s.id() == id)
    }

    /// Get the identifiers of all symbols in the library
    pub fn symbol_names(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.id()).collect()
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn into_symbols(self) -> Vec<SymbolEntry> {
        self.entries
    }
}
