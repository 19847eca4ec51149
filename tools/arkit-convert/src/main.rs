//! MakeHuman to ARKit blend shape converter.
//!
//! Reads MakeHuman raw face shapes (`*.target`), builds the 52 ARKit blend
//! shapes from them, writes the results, and prints which shapes still need
//! to be sculpted by hand.
//!
//! # Usage
//!
//! - `arkit-convert` - Convert using the default MakeHuman exchange checkout
//! - `arkit-convert --input <DIR> --output <DIR>` - Explicit locations
//! - `arkit-convert --catalog mapping.json` - Use a custom mapping table
//! - `arkit-convert --report report.json` - Also write the report as JSON

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mesh_blendshape::{convert, Catalog, ConvertParams};
use tracing_subscriber::EnvFilter;

/// Location of MakeHuman raw face shapes inside a home directory.
const DEFAULT_INPUT: &str = "code/f/mhx2-makehuman-exchange/import_runtime_mhx2/data/hm8/faceshapes/raw";

/// Default output location, relative to the working directory.
const DEFAULT_OUTPUT: &str = "assets/make_human/targets/arkit";

/// MakeHuman to ARKit blend shape converter
///
/// Combines MakeHuman face shapes into ARKit blend shapes. Shapes that cannot
/// be derived are listed at the end.
#[derive(Parser)]
#[command(name = "arkit-convert")]
#[command(about = "Convert MakeHuman face shapes to ARKit blend shapes", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory of MakeHuman raw `.target` files
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Alternate input directory, used when the primary does not exist
    #[arg(long = "fallback-input", value_name = "DIR")]
    fallback_inputs: Vec<PathBuf>,

    /// Directory for generated `.target` files
    ///
    /// The default is resolved against the current working directory, so run
    /// from the project root or pass an explicit path.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON mapping table replacing the built-in ARKit catalog
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Write the generation report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors and the summary
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn params(&self) -> ConvertParams {
        let input = self.input.clone().unwrap_or_else(default_input_dir);
        ConvertParams::new(input, &self.output)
            .with_fallback_input_dirs(self.fallback_inputs.clone())
    }

    fn catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load_json(path)
                .with_context(|| format!("failed to load catalog {}", path.display())),
            None => Ok(Catalog::arkit()),
        }
    }
}

fn default_input_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(DEFAULT_INPUT)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let params = cli.params();
    let catalog = cli.catalog()?;

    summary::print_header(&params);

    let output = convert(&params, &catalog)
        .with_context(|| format!("conversion into {} failed", params.output_dir.display()))?;

    summary::print_summary(&output);

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&output.report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    Ok(())
}
