// src/config.rs
// =============================================================================
// Turns raw CLI input into a validated crawl configuration.
//
// Every check that can fail before crawling happens here, so that a bad
// flag is reported right away with a clear message:
// - the seed must normalize to an http/https address
// - there must be at least one worker
// - the timeout must be positive
// - the host pattern must compile
//
// All failures are CrawlError::Configuration.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::address::{normalize, Address};
use crate::cli::Cli;
use crate::dump::DumpFormat;
use crate::error::{CrawlError, Result};
use crate::extract::ExtractorKind;
use crate::fetch::DEFAULT_USER_AGENT;
use crate::filter::HostFilter;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: Address,
    pub max_count: usize,
    pub workers: usize,
    pub timeout: Duration,
    pub filter: HostFilter,
    pub extractor: ExtractorKind,
    pub graph: bool,
    pub format: DumpFormat,
    pub output: Option<PathBuf>,
    pub logging: bool,
    pub deadline: Option<Duration>,
    pub user_agent: String,
}

impl CrawlConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let seed = normalize(&cli.seed)
            .map_err(|e| CrawlError::config(format!("invalid seed: {}", e)))?;

        if cli.workers == 0 {
            return Err(CrawlError::config("worker count must be at least 1"));
        }

        if cli.timeout == 0 {
            return Err(CrawlError::config("timeout must be greater than 0 ms"));
        }

        let filter = match (&cli.host, &cli.host_pattern, cli.same_host) {
            (Some(host), _, _) => HostFilter::exact(host)?,
            (None, Some(pattern), _) => HostFilter::pattern(pattern)?,
            (None, None, true) => {
                let host = seed
                    .host()
                    .ok_or_else(|| CrawlError::config("seed has no host"))?;
                HostFilter::exact(host)?
            }
            (None, None, false) => HostFilter::Unrestricted,
        };

        Ok(Self {
            seed,
            max_count: cli.max_count,
            workers: cli.workers,
            timeout: Duration::from_millis(cli.timeout),
            filter,
            extractor: cli.extractor,
            graph: cli.graph,
            format: cli.format,
            output: cli.output.filter(|path| !path.is_empty()).map(PathBuf::from),
            logging: cli.logging,
            deadline: cli.deadline.map(Duration::from_secs),
            user_agent: cli
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}
