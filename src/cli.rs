use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info};

use crate::formats::Format;

pub const ABOUT: &str = "Detailer removes junk past the end of media files.";

#[derive(Parser, Debug)]
#[command(name = "detailer")]
#[command(version, about = ABOUT, long_about = None)]
pub struct Cli {
    /// Truncate the file to the end of its image data
    #[arg(long)]
    pub truncate: bool,

    /// Output results as machine-readable JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// JPEG or PNG file to inspect
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub truncate: bool,
    pub output: OutputMode,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            truncate: cli.truncate,
            output: if cli.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            },
        }
    }
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::TRACE
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub format: &'static str,
    pub size: u64,
    pub data_size: u64,
    pub truncated: bool,
}

impl Report {
    pub fn trailing_bytes(&self) -> u64 {
        self.size.saturating_sub(self.data_size)
    }

    pub fn render(&self, mode: OutputMode) -> Result<String> {
        match mode {
            OutputMode::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputMode::Text => {
                let mut line = format!(
                    "{}: {} bytes, image data ends at {} ({} trailing bytes)",
                    self.format,
                    self.size,
                    self.data_size,
                    self.trailing_bytes()
                );
                if self.truncated {
                    line.push_str(", truncated");
                }
                Ok(line)
            }
        }
    }
}

pub fn usage() -> String {
    format!("{ABOUT}\n{}", Cli::command().render_help())
}

pub fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Locates the end of the image data in `path` and truncates the file to it
/// when asked and there is something past it.
pub fn process_file(path: &Path, options: &RunOptions) -> Result<Report> {
    let format = Format::resolve(path)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(options.truncate)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let size = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    let result = format.parse(&mut file)?;
    info!(
        "{}: {} is {} bytes, data ends at {}",
        format,
        path.display(),
        size,
        result.data_end
    );

    let truncated = options.truncate && result.has_trailing_data(size);
    if truncated {
        debug!("truncating {} to {} bytes", path.display(), result.data_end);
        file.set_len(result.data_end)
            .with_context(|| format!("Failed to truncate {}", path.display()))?;
    } else {
        debug!(
            "leaving {} untouched ({} trailing bytes)",
            path.display(),
            result.trailing_bytes(size)
        );
    }

    Ok(Report {
        format: format.tag(),
        size,
        data_size: result.data_end,
        truncated,
    })
}

/// Runs the command line and returns the process exit code.
pub fn run(cli: Cli) -> i32 {
    init_tracing(cli.log_level());

    let Some(file) = cli.file.as_deref() else {
        eprintln!("{}", usage());
        return 1;
    };

    let options = RunOptions::from(&cli);
    match process_file(file, &options).and_then(|report| report.render(options.output)) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    }
}
