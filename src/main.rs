//! alto2tei - ALTO to TEI converter

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use alto2tei::tei::{self, DocumentMetadata};
use alto2tei::{Config, Document};

#[derive(Parser)]
#[command(name = "alto2tei")]
#[command(version, about = "ALTO to TEI converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    alto2tei data/bpt6k1090902t             Convert one document directory
    alto2tei data/* -o tei                  Convert a corpus into tei/
    alto2tei --offline data/bpt6k1090902t   Skip the IIIF/SRU lookups")]
struct Cli {
    /// Document directories containing ALTO files (one directory per
    /// document). When omitted, every sub-directory of the configured
    /// data path is converted.
    #[arg(value_name = "DIRS")]
    dirs: Vec<PathBuf>,

    /// Output directory for the TEI files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip metadata fetching; headers get placeholder text
    #[arg(long)]
    offline: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let output_dir = cli.output.unwrap_or_else(|| config.data.output.clone());

    let dirs = if cli.dirs.is_empty() {
        match document_dirs(&config.data.path) {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("error: {}: {e}", config.data.path.display());
                return ExitCode::FAILURE;
            }
        }
    } else {
        cli.dirs
    };

    let mut failures = 0usize;
    for dir in &dirs {
        if let Err(e) = convert(&config, dir, &output_dir, cli.offline, cli.quiet) {
            error!("{}: {e}", dir.display());
            failures += 1;
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        eprintln!("error: {failures} of {} documents failed", dirs.len());
        ExitCode::FAILURE
    }
}

/// Every sub-directory of the data path, in name order.
fn document_dirs(data_path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(data_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn convert(
    config: &Config,
    dir: &Path,
    output_dir: &Path,
    offline: bool,
    quiet: bool,
) -> alto2tei::Result<()> {
    let document = Document::open(dir)?;

    let start = Instant::now();
    let metadata = if offline {
        DocumentMetadata::offline()
    } else {
        DocumentMetadata::fetch(config, &document.name)
    };
    info!("{}: metadata resolved in {:.2?}", document.name, start.elapsed());

    let start = Instant::now();
    let root = tei::build_document(config, &document, &metadata)?;
    info!("{}: TEI tree built in {:.2?}", document.name, start.elapsed());

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.xml", document.name));
    std::fs::write(&path, tei::xml::serialize(&root))?;

    if !quiet {
        println!("{} -> {}", dir.display(), path.display());
    }
    Ok(())
}
