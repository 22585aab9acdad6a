// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mintwatch")]
#[command(about = "Inspect token deployment lifecycle rules and retry guidance")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a mintwatch.yml configuration template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the retry decision for an error code
    Classify {
        /// Error code, e.g. TIMEOUT or KYC_NOT_VERIFIED
        code: String,

        /// Category used when the code has no dedicated entry
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List the statuses reachable from a status
    Transitions {
        /// Status name or ordinal
        status: String,
    },

    /// Check whether a single transition is allowed
    Check {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Print the retry delay schedule for a policy
    Backoff {
        /// Retry policy name
        #[arg(short, long, default_value = "RetryableWithDelay")]
        policy: String,

        /// Number of attempts to show
        #[arg(short, long, default_value_t = 6)]
        attempts: u32,

        /// Use a constant delay instead of exponential backoff
        #[arg(long)]
        linear: bool,
    },
}
