//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "layout-cli",
    version,
    about = "Resolve form layouts and repeating groups against a data record",
    long_about = "Expand flat form layouts into node trees, one row per repeating-group \
                  entry found in the data, and evaluate dynamic properties."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build and resolve all pages, then print one of them.
    Resolve(ResolveArgs),

    /// Print the repeating-group state derived from the data.
    Groups(SourceArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// A directory of page files, a single layout file, or a file mapping page names to layouts.
    #[arg(long = "layouts", value_name = "DIR|FILE")]
    pub layouts: PathBuf,

    /// The form data record (nested JSON or flat dotted keys).
    #[arg(long = "data", value_name = "FILE")]
    pub data: PathBuf,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Page to print (default: the first page).
    #[arg(long = "page", value_name = "NAME")]
    pub page: Option<String>,

    /// Instance context for `instanceContext` expressions.
    #[arg(long = "instance", value_name = "FILE")]
    pub instance: Option<PathBuf>,

    /// Application settings for `frontendSettings` expressions.
    #[arg(long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Text resources used to suffix per-row text ids.
    #[arg(long = "texts", value_name = "FILE")]
    pub texts: Option<PathBuf>,

    /// Component id to treat as hidden (repeatable).
    #[arg(long = "hidden", value_name = "ID")]
    pub hidden: Vec<String>,

    /// Fail on child references to missing components.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Keep text resource ids unchanged inside repeating groups.
    #[arg(long = "no-text-rewrite")]
    pub no_text_rewrite: bool,

    /// Keep `[{n}]` markers in mapping keys.
    #[arg(long = "no-mapping-rewrite")]
    pub no_mapping_rewrite: bool,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "tree")]
    pub format: OutputFormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Tree,
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
