//! CLI argument definitions for bcookies

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bcookies")]
#[command(version)]
#[command(about = "Dump Safari Cookies.binarycookies files", long_about = None)]
pub struct Cli {
    /// Path to the Cookies.binarycookies file
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: Format,

    /// Sort records by this column (file order when omitted)
    #[arg(short, long, value_enum)]
    pub sort: Option<SortKey>,

    /// Also show flags, the port marker and the creation time
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the trailing binary plist payload to this path
    #[arg(long, value_name = "PATH")]
    pub extract_plist: Option<PathBuf>,

    /// Skip malformed cookie records instead of aborting
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Tsv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Domain,
    Name,
    Created,
    Expiry,
}
