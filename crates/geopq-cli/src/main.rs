//! Command-line interface for `geopq`, a GeoJSON to GeoParquet converter.
//!
//! This binary is a thin façade over the [`geopq_core`] library: it parses
//! arguments with [`clap`], configures [`tracing`] based logging and delegates
//! to command handlers.
//!
//! # Available Commands
//!
//! - `generate` - Convert a GeoJSON file into GeoParquet with an inferred schema
//! - `schema` - Display the inferred schema and geometry summary of a GeoJSON file
//! - `version` - Display the program version

mod display;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geopq_core::paths::{default_output_path, validate_input_path, validate_output_path};
use geopq_core::{
    CompressionCodec, DEFAULT_MAX_ROW_GROUP_SIZE, GenerateOptions, GeoPqError, operations,
};

use crate::display::{display_dataset_info, display_generate_summary};

#[derive(Parser)]
#[command(
    name = "geopq",
    version,
    about = "Convert GeoJSON to GeoParquet with automatic schema inference",
    long_about = "geopq reads GeoJSON features, infers one column type per property and writes\n\
                  a GeoParquet file with WKB geometries and `geo` metadata."
)]
/// Command-line arguments and options for the `geopq` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `geopq` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Converts a GeoJSON file into a GeoParquet file.
    Generate {
        /// Path to the input GeoJSON file.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Path for the output file (default: <input stem>.parquet).
        #[arg(short, long, value_name = "PATH", env = "GEOPQ_OUTPUT_PATH")]
        output: Option<PathBuf>,

        /// Column compression codec.
        #[arg(
            long,
            value_name = "CODEC",
            env = "GEOPQ_COMPRESSION",
            default_value_t = CompressionCodec::Zstd
        )]
        compression: CompressionCodec,

        /// Maximum number of rows per row group.
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ROW_GROUP_SIZE)]
        row_group_size: usize,

        /// Also store property column names and types in the file metadata.
        #[arg(long)]
        property_metadata: bool,
    },

    /// Displays the inferred schema of a GeoJSON file.
    Schema {
        /// Path to the input GeoJSON file.
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Displays the program version.
    Version,
}

/// Entry point for the `geopq` command-line interface.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        eprintln!("Error: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        },
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true) // Show module paths for better context
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Generate {
            input,
            output,
            compression,
            row_group_size,
            property_metadata,
        } => {
            let options = GenerateOptions::new()
                .with_compression(compression)
                .with_max_row_group_size(row_group_size)
                .with_property_metadata(property_metadata);
            handle_generate(&input, output.as_deref(), &options)
        },
        Commands::Schema { input } => handle_schema(&input),
        Commands::Version => {
            handle_version();
            Ok(())
        },
    }
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<GeoPqError>() {
        Some(geo_err) => {
            eprintln!("Error: {}", geo_err.user_message());
            if let Some(suggestion) = geo_err.recovery_suggestion() {
                eprintln!("Hint: {suggestion}");
            }
            debug!("{geo_err:?}");
        },
        None => eprintln!("Error: {err:#}"),
    }
}

/// Output path from the flag or environment, else derived from the input.
fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    output.map_or_else(|| default_output_path(input), Path::to_path_buf)
}

fn handle_generate(input: &Path, output: Option<&Path>, options: &GenerateOptions) -> Result<()> {
    let output = resolve_output_path(input, output);
    info!("Generating {} from {}", output.display(), input.display());

    validate_input_path(input)?;
    validate_output_path(&output)?;

    let summary = operations::generate(input, &output, options)?;
    display_generate_summary(&summary);
    Ok(())
}

fn handle_schema(input: &Path) -> Result<()> {
    info!("Inferring schema of {}", input.display());

    validate_input_path(input)?;
    let info = operations::inspect(input)?;
    display_dataset_info(&info);
    Ok(())
}

fn handle_version() {
    println!("geopq {}", env!("CARGO_PKG_VERSION"));
}
