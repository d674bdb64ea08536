use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use symdex_eda::{KicadSymbolLibrary, ScanOptions, SymbolIndexBuilder};

use crate::output::write_json;

#[derive(Args, Debug)]
#[command(about = "Print the extracted entries of a single .kicad_sym file")]
pub struct InspectArgs {
    /// Library file to parse
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Only print the symbol with this identifier
    #[arg(long, value_name = "ID")]
    id: Option<String>,

    /// Ignore parentheses inside quoted strings when splitting symbol blocks
    #[arg(long)]
    quote_aware: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let options = ScanOptions {
        quote_aware: args.quote_aware,
    };
    let library = KicadSymbolLibrary::from_file(&args.file, options)?;
    let stats = library.stats();
    if stats.skipped() > 0 {
        log::warn!(
            "{}: skipped {} of {} blocks",
            library.name(),
            stats.skipped(),
            stats.blocks
        );
    }

    let mut builder = SymbolIndexBuilder::new();
    builder.add_library(library);
    let mut index = builder.build();
    index.resolve_inheritance();

    let stdout = Path::new("-");
    match args.id {
        Some(id) => {
            let Some(entry) = index.get(&id) else {
                anyhow::bail!("Symbol '{id}' not found in {}", args.file.display());
            };
            write_json(entry, stdout)
        }
        None => write_json(&index, stdout),
    }
}
