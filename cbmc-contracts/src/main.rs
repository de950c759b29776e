//! check-contracts CLI

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cbmc_contracts::config::DEFAULT_BUILD_DIR;
use cbmc_contracts::{CheckError, ProcessRunner, RunConfig, Toolchain};

/// Check CBMC function contracts, one function at a time
#[derive(Parser)]
#[command(name = "check-contracts", version, about)]
struct Cli {
    /// Directory containing compile_commands.json
    #[arg(short = 'p', long, default_value = DEFAULT_BUILD_DIR)]
    build_dir: PathBuf,

    /// Only check this contract (repeatable)
    #[arg(short = 'c', long = "contract", value_name = "NAME")]
    contracts: Vec<String>,

    /// Files or directories to check (default: everything under the current directory)
    files: Vec<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,

    #[arg(long, env = "GOTO_CC", default_value = "goto-cc")]
    goto_cc: String,

    #[arg(long, env = "GOTO_INSTRUMENT", default_value = "goto-instrument")]
    goto_instrument: String,

    #[arg(long, env = "GOTO_HARNESS", default_value = "goto-harness")]
    goto_harness: String,

    #[arg(long, env = "CBMC", default_value = "cbmc")]
    cbmc: String,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    fn into_config(self, working_root: PathBuf) -> (RunConfig, Vec<PathBuf>) {
        let toolchain = Toolchain {
            goto_cc: self.goto_cc,
            goto_instrument: self.goto_instrument,
            goto_harness: self.goto_harness,
            cbmc: self.cbmc,
        };
        let config = RunConfig::new(working_root)
            .build_dir(self.build_dir)
            .allow_contracts(self.contracts)
            .toolchain(toolchain);
        (config, self.files)
    }
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = check(cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn check(cli: Cli) -> Result<(), CheckError> {
    let cwd = std::env::current_dir().map_err(|e| CheckError::io(".", e))?;
    let (config, files) = cli.into_config(cwd);
    cbmc_contracts::run(&config, &files, &ProcessRunner::new())?;
    Ok(())
}
