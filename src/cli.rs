use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::source::SourceKind;

/// Cycling race listings as subscribable iCalendar feeds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log formatter to use
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the web server and cache janitor (default)
    Serve,
    /// Convert a saved listing into a calendar on stdout
    Render(RenderArgs),
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct RenderArgs {
    /// Listing file to read
    #[arg(long, short)]
    pub input: PathBuf,

    /// Listing format
    #[arg(long, value_enum, default_value_t = SourceKind::Tiz)]
    pub format: SourceKind,

    /// Keep only races in these categories (repeatable)
    #[arg(long = "class")]
    pub classes: Vec<String>,

    /// Year for dates without one; defaults to the current year
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable, compact lines
    Pretty,
    /// One JSON object per event
    Json,
}

const fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}
