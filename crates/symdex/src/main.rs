use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod config;
mod file_walker;
mod index;
mod inspect;
mod output;

#[derive(Parser)]
#[command(name = "symdex")]
#[command(about = "Pin and geometry index for KiCad symbol libraries", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the JSON symbol index
    #[command(alias = "i")]
    Index(index::IndexArgs),

    /// Show what a single library parses to
    Inspect(inspect::InspectArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG still wins.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("info")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Index(args) => index::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
