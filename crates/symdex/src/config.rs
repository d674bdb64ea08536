use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "symdex.toml";

/// Library categories indexed when nothing else is configured.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "4xxx",
    "74xx",
    "Connector",
    "Device",
    "Diode",
    "LED",
    "MCU_ATmega",
    "MCU_STM32F1",
    "Memory_EEPROM",
    "OpAmp",
    "Oscillator",
    "Power",
    "Regulator_Linear",
    "Regulator_Switching",
    "Relay",
    "Sensor_Motion",
    "Sensor_Optical",
    "Sensor_Temperature",
    "Switch",
    "Timer",
    "Transistor_BJT",
    "Transistor_FET",
];

/// Top-level symdex.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymdexToml {
    pub index: IndexConfig,
}

/// `[index]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Directory holding the `.kicad_sym` files
    pub symbols_dir: PathBuf,
    /// Where the JSON snapshot is written; `-` for stdout
    pub output: PathBuf,
    /// Allowed library base names; empty admits every library
    pub categories: Vec<String>,
    /// Ignore parentheses inside quoted strings when splitting blocks
    pub quote_aware: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            symbols_dir: PathBuf::from("../symbols"),
            output: PathBuf::from("./symbols_index_with_pins.json"),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            quote_aware: false,
        }
    }
}

impl SymdexToml {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load an explicit config file, or `symdex.toml` in the working directory
    /// if one exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            log::debug!("Using {DEFAULT_CONFIG_FILE} from the working directory");
            return Self::from_file(implicit);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = SymdexToml::parse("").unwrap();
        assert_eq!(config, SymdexToml::default());
        assert_eq!(config.index.categories.len(), DEFAULT_CATEGORIES.len());
        assert!(!config.index.quote_aware);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = SymdexToml::parse(
            r#"
[index]
symbols_dir = "/usr/share/kicad/symbols"
categories = ["Device"]
"#,
        )
        .unwrap();
        assert_eq!(
            config.index.symbols_dir,
            PathBuf::from("/usr/share/kicad/symbols")
        );
        assert_eq!(config.index.categories, vec!["Device".to_string()]);
        assert_eq!(
            config.index.output,
            PathBuf::from("./symbols_index_with_pins.json")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SymdexToml::parse("[index]\ncategory = [\"Device\"]\n").unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn from_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symdex.toml");
        fs::write(&path, "[index\n").unwrap();
        let err = SymdexToml::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("symdex.toml"));
    }
}
