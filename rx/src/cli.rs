//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::invoker::Invocation;
use crate::outcome::SearchOutcome;
use crate::resolver::BinaryLocation;
use crate::search::RipGrep;

/// ripexec - bounded ripgrep runner
#[derive(Parser, Debug)]
#[command(name = "rx")]
#[command(author, version, about = "Run ripgrep as a bounded subprocess", long_about = None)]
pub struct Cli {
    // Long forms only: short flags would shadow ripgrep's own `-c` / `-l`
    /// Path to config file
    #[arg(long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long = "log-level", global = true, help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run ripgrep; the last value is the search target (`rx search -- -n TODO`)
    Search {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// ripgrep arguments followed by the target
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show which ripgrep binary would be used
    Which,
}

impl Command {
    /// Build the invocation for `search`
    pub fn invocation(&self) -> Option<Invocation> {
        match self {
            Self::Search { args, .. } => Invocation::from_trailing(args.clone()),
            Self::Which => None,
        }
    }
}

/// Result of checking the resolved binary
#[derive(Debug)]
pub struct BinaryCheck {
    pub location: BinaryLocation,
    pub available: bool,
    pub version: Option<String>,
}

impl BinaryCheck {
    /// Resolve the binary and ask it for its version
    pub async fn check(rg: &RipGrep) -> Self {
        let location = rg.resolve();
        debug!(path = ?location.path, "BinaryCheck::check: called");

        match rg.run(&Invocation::new(Vec::<String>::new(), "--version")).await {
            SearchOutcome::Matches { lines } => {
                debug!("BinaryCheck::check: binary available");
                Self {
                    location,
                    available: true,
                    version: Some(parse_version(&lines.join("\n"))),
                }
            }
            _ => {
                debug!("BinaryCheck::check: binary not available");
                Self {
                    location,
                    available: false,
                    version: None,
                }
            }
        }
    }
}

/// Parse version from command output (extracts first version-like string)
pub fn parse_version(output: &str) -> String {
    debug!(%output, "parse_version: called");
    for word in output.split_whitespace() {
        let word = word.trim_start_matches('v');
        if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            let version: String = word.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
            if !version.is_empty() {
                debug!(%version, "parse_version: found version");
                return version;
            }
        }
    }
    debug!("parse_version: no version found, returning unknown");
    "unknown".to_string()
}
