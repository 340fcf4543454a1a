//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, MAX_POLL_INTERVAL_SECS};
use crate::registry::Destination;

/// Watch GitHub commit feeds and announce every new commit.
#[derive(Debug, Parser)]
#[command(name = "livescroll-commits")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository URLs to watch (any text containing links works too)
    pub urls: Vec<String>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print notifications to stdout and read links from stdin instead of
    /// running the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Base polling interval in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_POLL_INTERVAL_SECS))]
    pub interval: Option<u64>,

    /// Network of the default destination
    #[arg(long)]
    pub network: Option<String>,

    /// Channel of the default destination
    #[arg(long)]
    pub channel: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold command-line overrides into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.interval {
            config.poll_interval_secs = secs;
        }
        if self.network.is_some() || self.channel.is_some() {
            let current = &config.default_destination;
            config.default_destination = Destination::new(
                self.network.clone().unwrap_or_else(|| current.network.clone()),
                self.channel.clone().unwrap_or_else(|| current.channel.clone()),
            );
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
    }
}
