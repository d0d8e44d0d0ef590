use std::path::PathBuf;

use clap::Parser;

/// Drives every "load more" list on an HTML page against its endpoint.
#[derive(Debug, Parser)]
#[command(name = "loadmore", version, about, long_about = None)]
pub struct Cli {
    /// HTML page containing the list instances.
    pub page: PathBuf,

    /// Base URL for relative `data-next` values and cursors.
    #[arg(long)]
    pub base_url: Option<String>,

    /// RON configuration file; missing fields keep their defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Additional attempts per activation (overrides the config file).
    #[arg(long)]
    pub retry_budget: Option<u32>,

    /// Stop after this many activation rounds.
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Only drive these instance ids (1-based, document order). Repeatable.
    #[arg(long = "instance")]
    pub instances: Vec<usize>,

    /// Directory receiving one HTML snapshot per instance.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
