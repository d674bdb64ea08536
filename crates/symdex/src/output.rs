use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::Serialize;

/// Write `value` as pretty JSON to `path`, replacing any previous snapshot.
///
/// `-` writes to stdout instead.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize index")?;
    json.push('\n');

    if path == Path::new("-") {
        std::io::stdout()
            .lock()
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(json.as_bytes())?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))?;
    Ok(())
}
