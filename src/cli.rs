//! CLI definitions: argument parsing, subcommands, and help text.

use std::net::SocketAddr;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  llm-sync serve                          Run the gateway in front of the backend
  llm-sync serve --listen 0.0.0.0:4100    Listen on another address
  llm-sync status                         Bootstrap once and print the resulting state
  llm-sync providers --query open         List providers matching 'open'
  llm-sync switch anthropic claude-sonnet-4-6
                                          Switch the active provider and model
  llm-sync watch                          Follow state changes; Enter forces a refresh
  llm-sync hints                          Print environment defaults as JSON
  llm-sync config                         Show paths, endpoints, and time budgets
  llm-sync completions bash               Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Keeps a UI's view of the active LLM provider and model in sync with its backend",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway that fronts the backend
    Serve {
        /// Listen address (overrides LLM_SYNC_LISTEN)
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Bootstrap once and print the resulting state
    Status,
    /// List providers from the live catalog, falling back to cache and built-in list
    Providers {
        /// Filter providers by id or name
        #[arg(long)]
        query: Option<String>,
    },
    /// Switch the active provider and model
    Switch {
        /// Provider id (e.g. anthropic)
        provider: String,
        /// Model offered by that provider
        model: String,
    },
    /// Follow bootstrap state and catalog; each line on stdin signals a config change
    Watch,
    /// Print the environment hints the gateway would serve
    Hints,
    /// Show config paths, endpoints, and time budgets
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
