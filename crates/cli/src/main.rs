//! C166/ST10 disassembler CLI.
//!
//! Decodes a raw binary or the executable sections of an ELF image linearly and prints, per
//! instruction:
//! 1. **Address and bytes:** The load address and raw encoding.
//! 2. **Disassembly:** The token stream rendered as text.
//! 3. **IR (`--ir`):** The lifted operations, one per line.
//!
//! Extension state can be seeded from a saved blob (`--state-in`), adjusted with range
//! overrides (`--page`, `--segment`, `--extr`, `--dpp`) and saved afterwards
//! (`--state-out`), so an analysis can be resumed across runs.

mod error;
mod image;
mod listing;
mod ranges;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use c166_core::config::{CpuConfig, CpuVariant};
use c166_core::{ExtensionStore, Lifter};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::listing::{RegionLabels, Summary};
use crate::ranges::{DppRange, Overrides, Span, ValueRange};

#[derive(Parser, Debug)]
#[command(
    name = "c166dis",
    author,
    version,
    about = "C166/ST10 disassembler and IR dumper",
    long_about = "Linear-sweep disassembler for C166/ST10 images.\n\nThe image is either a raw binary (loaded at --base) or an ELF file whose executable sections are decoded at their link addresses.\n\nExamples:\n  c166dis firmware.bin --base 0xC0000\n  c166dis app.elf --variant v2 --ir\n  c166dis rom.bin --page 0x2000:0x100:3 --state-out rom.state"
)]
struct Cli {
    /// Raw binary or ELF image to decode.
    image: PathBuf,

    /// Toolchain variant (vx, classic, v2); overrides the variant in --config.
    #[arg(long)]
    variant: Option<CpuVariant>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load address of a raw image.
    #[arg(long, default_value = "0", value_parser = ranges::parse_int)]
    base: u64,

    /// Restore extension state from a blob written by --state-out.
    #[arg(long)]
    state_in: Option<PathBuf>,

    /// Save the extension state after decoding.
    #[arg(long)]
    state_out: Option<PathBuf>,

    /// Force a page override on a range.
    #[arg(
        long = "page",
        value_name = "START:LEN:PAGE",
        value_parser = ranges::parse_page_range
    )]
    pages: Vec<ValueRange>,

    /// Force a segment override on a range.
    #[arg(
        long = "segment",
        value_name = "START:LEN:SEG",
        value_parser = ranges::parse_segment_range
    )]
    segments: Vec<ValueRange>,

    /// Force the extended SFR window on a range.
    #[arg(long = "extr", value_name = "START:LEN", value_parser = ranges::parse_span)]
    register_banks: Vec<Span>,

    /// Use custom DPP values on a range.
    #[arg(long = "dpp", value_name = "START:LEN:D0,D1,D2,D3", value_parser = ranges::parse_dpp_range)]
    dpp: Vec<DppRange>,

    /// Write the sweep counters as JSON.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the lifted IR under each instruction.
    #[arg(long)]
    ir: bool,

    /// Debug logging (otherwise RUST_LOG, default warn).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("c166dis: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Builds the configuration from `--config` and `--variant`.
///
/// A variant given on the command line replaces the file's variant-derived registers but
/// keeps its DPP vector.
fn load_config(cli: &Cli) -> Result<CpuConfig, CliError> {
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
            CpuConfig::from_json(&json)?
        }
        None => CpuConfig::default(),
    };
    Ok(match cli.variant {
        Some(variant) => CpuConfig {
            default_dpp: config.default_dpp,
            ..CpuConfig::for_variant(variant)
        },
        None => config,
    })
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let store = ExtensionStore::with_default_dpp(config.default_dpp);

    if let Some(path) = &cli.state_in {
        let blob = fs::read(path).map_err(|e| CliError::io(path, e))?;
        store.deserialize(&blob)?;
        info!(entries = store.len(), path = %path.display(), "restored extension state");
    }

    Overrides {
        pages: cli.pages.clone(),
        segments: cli.segments.clone(),
        register_banks: cli.register_banks.clone(),
        dpp: cli.dpp.clone(),
    }
    .apply(&store);

    let regions = image::load(&cli.image, cli.base)?;
    let lifter = Lifter::new(&store, &config);
    let labels = RegionLabels(&regions);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut total = Summary::default();
    for region in &regions {
        total.merge(listing::write_region(&mut out, region, &lifter, &labels, cli.ir)?);
    }
    out.flush()?;
    info!(
        instructions = total.instructions,
        undecoded = total.undecoded,
        lift_failures = total.lift_failures,
        "sweep complete"
    );

    if let Some(path) = &cli.summary {
        let report = serde_json::to_string_pretty(&total)?;
        fs::write(path, report).map_err(|e| CliError::io(path, e))?;
    }

    if let Some(path) = &cli.state_out {
        fs::write(path, store.serialize()).map_err(|e| CliError::io(path, e))?;
        info!(entries = store.len(), path = %path.display(), "saved extension state");
    }
    Ok(())
}
