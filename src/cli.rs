// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The Cli struct is only raw input. Validation (does the seed parse, does
// the pattern compile, ...) happens in config.rs.
// =============================================================================

use clap::{ArgAction, Parser};

use crate::dump::DumpFormat;
use crate::extract::ExtractorKind;

pub const DEFAULT_SEED: &str = "https://news.ycombinator.com";

#[derive(Parser, Debug)]
#[command(
    name = "link-harvester",
    version,
    about = "A bounded, concurrent web crawler that discovers links",
    long_about = "link-harvester starts from a seed URL, fetches pages with a pool of concurrent \
                  workers, and collects every distinct link it finds until it has found the \
                  requested number of addresses. The result is dumped one address per line."
)]
pub struct Cli {
    /// The address to start crawling from
    #[arg(short = 's', long, default_value = DEFAULT_SEED)]
    pub seed: String,

    /// Stop after this many distinct addresses have been found (0 = no limit)
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub max_count: usize,

    /// Number of concurrent workers
    #[arg(short = 'w', long, default_value_t = 10)]
    pub workers: usize,

    /// Timeout for each HTTP request, in milliseconds
    #[arg(short = 't', long, default_value_t = 5000)]
    pub timeout: u64,

    /// Only follow addresses on exactly this host
    #[arg(long, conflicts_with_all = ["host_pattern", "same_host"])]
    pub host: Option<String>,

    /// Only follow addresses whose host matches this regular expression
    #[arg(long, conflicts_with = "same_host")]
    pub host_pattern: Option<String>,

    /// Only follow addresses on the seed's host
    #[arg(long)]
    pub same_host: bool,

    /// Record which page links to which and include it in the dump
    #[arg(long)]
    pub graph: bool,

    /// How links are found in a page
    #[arg(long, value_enum, default_value_t = ExtractorKind::Pattern)]
    pub extractor: ExtractorKind,

    /// Output format of the dump
    #[arg(long, value_enum, default_value_t = DumpFormat::Plain)]
    pub format: DumpFormat,

    /// Write the dump to this file instead of the terminal (empty = terminal)
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Enable / disable logging (to stderr)
    #[arg(short = 'l', long, default_value_t = true, action = ArgAction::Set)]
    pub logging: bool,

    /// Cancel the crawl after this many seconds and dump what was found
    #[arg(long)]
    pub deadline: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,
}
