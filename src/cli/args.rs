//! Clap argument types.

use clap::{Args, Parser};
use std::path::PathBuf;

use strata::constants::DEFAULT_REFRESH_INTERVAL_SECS;

/// Inspect layered properties configuration.
#[derive(Parser, Debug)]
#[command(name = "strata", version = strata::constants::VERSION)]
pub struct Cli {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the process context and resource search path.
#[derive(Args, Debug, Default)]
pub struct ContextArgs {
    /// Environment name (overrides STRATA_ENV).
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Host name (overrides STRATA_HOST_NAME and the inferred host name).
    #[arg(long, global = true)]
    pub host_name: Option<String>,

    /// Local override directory (overrides STRATA_CONFIG_PATH).
    #[arg(long, global = true)]
    pub config_path: Option<String>,

    /// Resource root; repeat for several (overrides STRATA_RESOURCE_PATH).
    #[arg(long = "resource-path", global = true)]
    pub resource_paths: Vec<PathBuf>,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Show which layers were found for a file, in precedence order.
    Layers {
        /// Logical properties filename, e.g. `project.properties`.
        file: String,
    },

    /// Print the effective value of one key.
    Get {
        file: String,
        key: String,
        /// Print every list element on its own line.
        #[arg(long)]
        list: bool,
    },

    /// Print every effective key, its value, and the layer it came from.
    Dump {
        file: String,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Follow a key and print it whenever a refresh changes it.
    Watch {
        file: String,
        key: String,
        /// Seconds between freshness checks.
        #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)]
        interval: u64,
    },

    /// Print version and build information.
    Version,
}
