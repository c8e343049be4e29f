//! Record rendering and trailer extraction

use anyhow::{bail, Context, Result};
use binarycookies::{CookieRecord, Trailer};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use crate::cli::SortKey;

/// Render a Mac-epoch timestamp for humans, falling back to the raw
/// seconds when it does not fit a calendar date.
pub fn format_time(mac_seconds: f64) -> String {
    let unix = mac_seconds + binarycookies::MAC_EPOCH_OFFSET as f64;
    match DateTime::<Utc>::from_timestamp(unix as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{mac_seconds}"),
    }
}

pub fn sort(cookies: &mut [CookieRecord], key: SortKey) {
    match key {
        SortKey::Domain => cookies.sort_by(|a, b| a.domain.cmp(&b.domain)),
        SortKey::Name => cookies.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Created => {
            cookies.sort_by(|a, b| a.create_time.total_cmp(&b.create_time));
        }
        SortKey::Expiry => {
            cookies.sort_by(|a, b| a.expiry_time.total_cmp(&b.expiry_time));
        }
    }
}

pub fn print_table(cookies: &[CookieRecord], verbose: bool) {
    if verbose {
        println!(
            "{:<24} {:<40} {:<24} {:<12} {:<20} {:<20} {:<8} {}",
            "Name", "Value", "Domain", "Path", "Created", "Expires", "Port", "Flags"
        );
        for c in cookies {
            println!(
                "{:<24} {:<40} {:<24} {:<12} {:<20} {:<20} {:<8} {}",
                c.name,
                c.value,
                c.domain,
                c.path,
                format_time(c.create_time),
                format_time(c.expiry_time),
                c.has_port,
                c.flags
            );
        }
    } else {
        println!(
            "{:<24} {:<40} {:<24} {:<12} {}",
            "Name", "Value", "Domain", "Path", "Expires"
        );
        for c in cookies {
            println!(
                "{:<24} {:<40} {:<24} {:<12} {}",
                c.name,
                c.value,
                c.domain,
                c.path,
                format_time(c.expiry_time)
            );
        }
    }
}

pub fn print_tsv(cookies: &[CookieRecord], verbose: bool) {
    for c in cookies {
        if verbose {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                c.name,
                c.value,
                c.domain,
                c.path,
                format_time(c.create_time),
                format_time(c.expiry_time),
                c.has_port,
                c.flags
            );
        } else {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                c.name,
                c.value,
                c.domain,
                c.path,
                format_time(c.expiry_time)
            );
        }
    }
}

pub fn print_json(cookies: &[CookieRecord]) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(cookies).context("Failed to serialize cookies")?;
    println!("{rendered}");
    Ok(())
}

/// Write the trailing plist payload to `path`, or explain why there is
/// nothing to write.
pub fn extract_plist(trailer: &Trailer, path: &Path) -> Result<usize> {
    match trailer {
        Trailer::Present(payload) => {
            fs::write(path, payload)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(payload.len())
        }
        Trailer::SignatureMismatch => {
            bail!("trailing bytes after the cookie data are not a binary plist")
        }
        Trailer::NoRoom => bail!("container has no trailing plist payload"),
    }
}
