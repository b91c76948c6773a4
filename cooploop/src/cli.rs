//! CLI argument parsing for cooploop

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cooploop - cooperative scheduling playground
#[derive(Parser, Debug)]
#[command(name = "cooploop")]
#[command(author, version, about = "Run task scenarios on a single-threaded cooperative scheduler", long_about = None)]
#[command(after_help = "Logs are written to: ~/.local/share/cooploop/logs/cooploop.log")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use simulated time instead of sleeping
    #[arg(long = "virtual", global = true)]
    pub virtual_time: bool,

    /// Length of one scenario time unit in milliseconds
    #[arg(short, long, global = true)]
    pub unit_ms: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scenario file
    Run {
        /// Path to a YAML scenario
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Run a built-in scenario
    Demo {
        /// Built-in scenario name (see `list`)
        #[arg(required = true)]
        name: String,
    },

    /// Run a scenario cooperatively and fully blocking, and compare
    Compare {
        /// Built-in scenario name or path to a YAML scenario
        #[arg(required = true)]
        target: String,
    },

    /// List built-in scenarios
    List,
}

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
