//! CLI definitions for Glidepath.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Glidepath CLI.
#[derive(Parser)]
#[command(name = "glidepath")]
#[command(about = "Solves slider captchas in a running Chrome")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Watch a tab and solve configured sliders as they appear
    Watch {
        /// Chrome remote debugging endpoint (overrides the config)
        #[arg(long, env = "GLIDEPATH_ENDPOINT")]
        endpoint: Option<String>,

        /// Attach to the first tab whose URL contains this
        #[arg(long)]
        page: Option<String>,
    },

    /// Load and validate the configuration
    CheckConfig,
}
