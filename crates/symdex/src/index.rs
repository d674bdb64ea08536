use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use rayon::prelude::*;
use symdex_eda::{LibrarySource, ScanOptions, build_index};

use crate::config::SymdexToml;
use crate::file_walker::{CategoryFilter, find_symbol_libraries};
use crate::output::write_json;

#[derive(Args, Debug)]
#[command(about = "Build the symbol index from a directory of .kicad_sym libraries")]
pub struct IndexArgs {
    /// Directory containing .kicad_sym files (default: ../symbols)
    #[arg(value_name = "DIR")]
    symbols_dir: Option<PathBuf>,

    /// Output JSON path, `-` for stdout (default: ./symbols_index_with_pins.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Library category to include (file name without extension); repeatable
    #[arg(short, long = "category", value_name = "NAME", conflicts_with = "all_categories")]
    categories: Vec<String>,

    /// Include every library regardless of category
    #[arg(long)]
    all_categories: bool,

    /// Config file (default: ./symdex.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ignore parentheses inside quoted strings when splitting symbol blocks
    #[arg(long)]
    quote_aware: bool,

    /// Number of parser threads (default: one per core)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,
}

pub fn execute(args: IndexArgs) -> Result<()> {
    let mut config = SymdexToml::load(args.config.as_deref())?.index;
    if let Some(dir) = args.symbols_dir {
        config.symbols_dir = dir;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if args.all_categories {
        config.categories.clear();
    } else if !args.categories.is_empty() {
        config.categories = args.categories;
    }
    config.quote_aware |= args.quote_aware;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure parser threads")?;
    }

    eprintln!(
        "{} {}",
        "Searching".cyan().bold(),
        config.symbols_dir.display()
    );
    let filter = CategoryFilter::new(config.categories.iter().cloned());
    let files = find_symbol_libraries(&config.symbols_dir, &filter);
    eprintln!("Found {} library files", files.len());

    let sources: Vec<LibrarySource> = files
        .par_iter()
        .filter_map(|path| match LibrarySource::from_file(path) {
            Ok(source) => Some(source),
            Err(err) => {
                log::warn!("{err:#}");
                None
            }
        })
        .collect();

    let options = ScanOptions {
        quote_aware: config.quote_aware,
    };
    let mut index = build_index(sources, options);
    let stats = index.stats();
    eprintln!(
        "Parsed {} symbols ({} blocks, {} skipped)",
        index.len(),
        stats.scan.blocks,
        stats.scan.skipped()
    );

    let resolved = index.resolve_inheritance();
    if resolved.missing_base > 0 {
        log::info!(
            "{} symbols extend a base that is not in the index",
            resolved.missing_base
        );
    }

    write_json(&index, &config.output)?;
    eprintln!(
        "{} symbol index to {}",
        "Saved".green().bold(),
        config.output.display()
    );
    Ok(())
}
