//! KTM CAN CLI Application
//!
//! Command-line front end for the ktm-can-decoder library. It adds:
//! - Reading CSV bus captures from a file or stdin
//! - Signal change tracking (only print values that moved)
//! - Text or JSON output
//! - A run summary

use anyhow::{Context, Result};
use clap::Parser;
use ktm_can_decoder::{FrameLayout, SignalName};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod log_reader;
mod output;
mod pipeline;
mod report;
mod state;

use output::OutputFormat;

/// KTM CAN - Decode motorcycle CAN bus captures
#[derive(Parser, Debug)]
#[command(name = "ktm-can")]
#[command(about = "Decode KTM CAN bus captures (CSV: Timestamp,ID,Data0..Data7)", long_about = None)]
#[command(version)]
struct Args {
    /// Capture file to decode (default: stdin)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also print the bits no known field accounts for
    #[arg(short, long)]
    unmapped: bool,

    /// Keep decoding frames whose constant bytes changed
    #[arg(long)]
    no_assertions: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Print every value, not only changes
    #[arg(short, long)]
    all: bool,

    /// Only decode this identifier, in hex (can be repeated)
    #[arg(long = "id", value_name = "HEX", value_parser = parse_hex_id)]
    ids: Vec<u32>,

    /// Print a run summary to stderr when done
    #[arg(short, long)]
    summary: bool,

    /// List the known frame layouts and exit
    #[arg(long)]
    list_layouts: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_hex_id(s: &str) -> std::result::Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid identifier {:?}: {}", s, e))
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("KTM CAN CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", ktm_can_decoder::VERSION);

    if args.list_layouts {
        print_layouts();
        return Ok(());
    }

    let config = build_config(&args)?;
    log::debug!("Effective configuration: {:?}", config);

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            log::info!("Decoding capture: {:?}", path);
            let file = File::open(path)
                .with_context(|| format!("Failed to open capture file: {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        _ => {
            log::info!("Decoding capture from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = pipeline::run(&config, input, &mut out)?;
    out.flush().context("Failed to flush output")?;

    if summary.total_errors() > 0 {
        log::warn!("{} frame(s) could not be decoded", summary.total_errors());
    }
    if args.summary {
        eprint!("{}", summary.render());
    }

    Ok(())
}

/// Merge the optional config file with command line overrides
fn build_config(args: &Args) -> Result<config::AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    if args.unmapped {
        config.decoder.emit_unmapped = true;
    }
    if args.no_assertions {
        config.decoder.check_invariants = false;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.all {
        config.output.changes_only = false;
    }
    if !args.ids.is_empty() {
        config.filter.identifiers = Some(args.ids.clone());
    }

    Ok(config)
}

fn print_layouts() {
    println!("Known frame layouts:");
    for layout in FrameLayout::ALL {
        let names: Vec<String> = layout
            .fields()
            .iter()
            .map(|f| {
                if f.name.is_tentative() {
                    format!("{}?", f.name)
                } else {
                    f.name.to_string()
                }
            })
            .collect();
        println!(
            "  0x{:03X} every {:>3} ms  {}",
            layout.identifier(),
            layout.cadence_ms(),
            names.join(", ")
        );
    }
    println!(
        "\nWith --unmapped every known frame also emits '{}'.",
        SignalName::Unmapped
    );
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
