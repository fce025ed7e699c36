// src/dump.rs
// =============================================================================
// Writes the final frontier to the terminal or a file.
//
// Plain format: one address per line. In graph mode every address line is
// followed by its outgoing links, each indented with a tab:
//
//   https://a.example/
//   \thttps://a.example/one
//   https://a.example/one
//
// JSON format: an array of {"address", "status", "outgoing"?} objects.
//
// The output file is opened (and truncated) BEFORE the crawl starts, so an
// unwritable path is reported immediately instead of after minutes of work.
// =============================================================================

use clap::ValueEnum;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::crawl::Entry;
use crate::error::{CrawlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DumpFormat {
    /// Newline-delimited addresses
    #[default]
    Plain,
    /// Pretty-printed JSON array
    Json,
}

// Renders entries into bytes
//
// Parameters:
//   entries: the frontier contents (already sorted by the frontier)
//   format: plain lines or JSON
pub fn render(entries: &[Entry], format: DumpFormat) -> Result<Vec<u8>> {
    match format {
        DumpFormat::Plain => Ok(render_plain(entries).into_bytes()),
        DumpFormat::Json => {
            let mut out = serde_json::to_vec_pretty(entries).map_err(io::Error::from)?;
            out.push(b'\n');
            Ok(out)
        }
    }
}

fn render_plain(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry.address.as_str());
        out.push('\n');
        for target in entry.outgoing.iter().flatten() {
            out.push('\t');
            out.push_str(target.as_str());
            out.push('\n');
        }
    }
    out
}

/// Where the dump goes
#[derive(Debug)]
pub enum Sink {
    Terminal,
    File { path: PathBuf, file: File },
}

impl Sink {
    // Opens the output destination
    //
    // None or an empty path means the terminal (stdout)
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Sink::Terminal),
            Some(path) if path.as_os_str().is_empty() => Ok(Sink::Terminal),
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    CrawlError::config(format!(
                        "cannot open output file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Sink::File {
                    path: path.to_path_buf(),
                    file,
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Sink::Terminal => "terminal".to_string(),
            Sink::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Sink::Terminal => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(bytes)?;
                handle.flush()?;
            }
            Sink::File { file, .. } => {
                file.write_all(bytes)?;
                file.flush()?;
            }
        }
        Ok(())
    }
}
