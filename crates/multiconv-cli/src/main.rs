use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

/// Top-level CLI argument parser for the `conv-harness` command
#[derive(Parser)]
#[command(
    name = "conv-harness",
    about = "Time and cross-check multichannel convolutions",
    version
)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `conv-harness` CLI
#[derive(Subcommand)]
enum Commands {
    /// Run the reference and optimized convolutions once and compare them
    Run {
        /// Output width
        width: usize,
        /// Output height
        height: usize,
        /// Kernel order: 1, 3, 5 or 7
        kernel_order: usize,
        /// Number of channels
        nchannels: usize,
        /// Number of kernels
        nkernels: usize,
        /// Seed for input generation
        #[arg(long, default_value_t = multiconv::harness::DEFAULT_SEED)]
        seed: u64,
        /// Worker threads for the optimized convolution (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
        /// Row reducer backend: auto, scalar, or simd
        #[arg(long, default_value = "auto")]
        backend: String,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,
        /// Print the optimized output tensor after the report
        #[arg(long)]
        dump: bool,
    },
    /// Run every shape listed in a YAML suite file
    Suite {
        /// Path to the suite YAML file
        suite: PathBuf,
        /// Worker threads for the optimized convolution (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            width,
            height,
            kernel_order,
            nchannels,
            nkernels,
            seed,
            threads,
            backend,
            format,
            dump,
        } => {
            let args = commands::run::RunArgs {
                width,
                height,
                kernel_order,
                nchannels,
                nkernels,
                seed,
                threads,
                backend,
                dump,
            };
            commands::run::run(&args, format.parse()?)
        }
        Commands::Suite {
            suite,
            threads,
            format,
        } => {
            commands::suite::run(&suite, threads, format.parse()?)
        }
    }
}

/// Install a stderr `tracing` subscriber honoring `RUST_LOG`
fn setup_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    // A second init (e.g. in tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
