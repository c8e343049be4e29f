mod cli;
mod output;

use anyhow::{Context, Result};
use binarycookies::ParseOptions;
use clap::Parser;
use std::fs;

use cli::{Cli, Format};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data = fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let options = ParseOptions {
        lenient: cli.lenient,
    };
    let decoded = binarycookies::parse_with(&data, &options)
        .with_context(|| format!("Failed to decode {}", cli.input.display()))?;

    for warning in &decoded.warnings {
        eprintln!("warning: skipped {warning}");
    }

    let mut cookies = decoded.cookies;
    if let Some(key) = cli.sort {
        output::sort(&mut cookies, key);
    }

    match cli.format {
        Format::Table => output::print_table(&cookies, cli.verbose),
        Format::Tsv => output::print_tsv(&cookies, cli.verbose),
        Format::Json => output::print_json(&cookies)?,
    }

    if let Some(path) = &cli.extract_plist {
        let written = output::extract_plist(&decoded.trailer, path)?;
        eprintln!("Wrote {} plist bytes to {}", written, path.display());
    }

    Ok(())
}
