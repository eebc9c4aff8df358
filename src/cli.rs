use crate::config;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate yields for every symbol in the universe; no stored state is
    /// read or written.
    Full(RunArgs),

    /// Detect fundamentals changes and recompute only the triggered symbols
    /// (the default when no subcommand is given).
    Event(EventArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Comma-separated symbols overriding the configured universe,
    /// e.g. 2330.TW,2317.TW
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Years of dividend history used for payout-ratio averaging.
    #[arg(long, default_value_t = config::DEFAULT_YEARS_FOR_PAYOUT)]
    pub years: u32,

    /// Yield threshold for the filtered table (0.06 = 6%).
    #[arg(long, default_value_t = config::DEFAULT_YIELD_THRESHOLD)]
    pub threshold: f64,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            years: config::DEFAULT_YEARS_FOR_PAYOUT,
            threshold: config::DEFAULT_YIELD_THRESHOLD,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct EventArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Force recomputation of every symbol this run; detected reasons are
    /// still reported.
    #[arg(long)]
    pub force_all: bool,
}
