//! # binarycookies
//!
//! Decoder for Safari's `Cookies.binarycookies` container, the proprietary
//! binary format macOS and iOS use to persist HTTP cookies. Built as a
//! forensic artifact reader: input is an arbitrary, possibly corrupted
//! buffer; output is the full ordered set of cookie records plus the
//! optional trailing binary-plist payload.
//!
//! # Format Overview
//!
//! ## Container
//!
//! - Bytes 0-3: "cook" magic
//! - Bytes 4-7: page count (big-endian)
//! - Then: page-size table, `pageCount` big-endian words
//! - Then: page blocks, back to back, sizes per the table
//! - Then: 4-byte checksum + 8-byte footer signature (not parsed)
//! - Optionally: a binary plist payload beginning with `bplist00`
//!
//! ## Page
//!
//! - 4-byte header word (accepted unvalidated)
//! - 4-byte cookie count (little-endian)
//! - `cookieCount` 4-byte intra-page offsets (little-endian)
//! - 4-byte footer word (accepted unvalidated)
//! - Cookie records addressed by the offsets, each prefixed by a 4-byte
//!   little-endian size word
//!
//! ## Cookie record body
//!
//! - 4 reserved bytes, 4-byte flags, 4-byte port marker
//! - Four 4-byte field offsets (url, name, path, value)
//! - 8 reserved bytes, then expiry and creation times as 8-byte
//!   little-endian floats (seconds since 2001-01-01T00:00:00Z)
//! - Null-terminated text fields at their stored offsets minus 4
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("Cookies.binarycookies")?;
//! let decoded = binarycookies::parse(&data)?;
//!
//! for cookie in &decoded.cookies {
//!     println!("{} {}={}", cookie.domain, cookie.name, cookie.value);
//! }
//! if let Some(plist) = decoded.trailer.payload() {
//!     println!("{} trailing plist bytes", plist.len());
//! }
//! # Ok(())
//! # }
//! ```

mod cookie;
mod cursor;
mod page;
mod trailer;

pub use cookie::{CookieFlags, CookieRecord, MAC_EPOCH_OFFSET};
pub use cursor::{Cursor, CursorError};
pub use trailer::Trailer;

/// Magic bytes at the start of every container
pub const MAGIC: [u8; 4] = *b"cook";

/// Signature of a trailing binary plist payload
pub const BPLIST_MAGIC: &[u8; 8] = b"bplist00";

/// Decode failures. Strict decoding aborts on the first of these; the
/// variants carry the failing page, cookie and field for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a binarycookies container: file begins with {found:02x?} instead of \"cook\"")]
    MalformedHeader { found: [u8; 4] },

    #[error("truncated container header: {source}")]
    PageTableTruncated { source: CursorError },

    #[error("negative page count {0}")]
    NegativePageCount(i32),

    #[error("page {page}: negative declared size {size}")]
    NegativePageSize { page: usize, size: i32 },

    #[error("page {page}: declared {declared} bytes but only {available} remain in the container")]
    PageTruncated {
        page: usize,
        declared: usize,
        available: usize,
    },

    #[error("page {page}: truncated cookie table: {source}")]
    CookieTableTruncated { page: usize, source: CursorError },

    #[error("page {page}: negative cookie count {count}")]
    NegativeCookieCount { page: usize, count: i32 },

    #[error("page {page}, cookie {cookie}: negative record offset {offset}")]
    NegativeCookieOffset {
        page: usize,
        cookie: usize,
        offset: i32,
    },

    #[error("page {page}, cookie {cookie}: negative record size {size}")]
    NegativeCookieSize {
        page: usize,
        cookie: usize,
        size: i32,
    },

    #[error("page {page}, cookie {cookie}: truncated record: {source}")]
    CookieTruncated {
        page: usize,
        cookie: usize,
        source: CursorError,
    },

    #[error(
        "page {page}, cookie {cookie}: {field} offset {offset} falls outside the {len}-byte record"
    )]
    OffsetOutOfRange {
        page: usize,
        cookie: usize,
        field: &'static str,
        offset: i32,
        len: usize,
    },

    #[error("page {page}, cookie {cookie}: {field} field has no null terminator")]
    FieldUnterminated {
        page: usize,
        cookie: usize,
        field: &'static str,
    },
}

/// Decode options. The default is strict, all-or-nothing decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Skip a malformed cookie record and keep walking the page,
    /// collecting the error as a warning, instead of aborting.
    pub lenient: bool,
}

/// A fully decoded container
#[derive(Debug)]
pub struct BinaryCookies {
    /// Every cookie, in page order then per-page offset-table order
    pub cookies: Vec<CookieRecord>,
    /// Outcome of the trailing-plist probe
    pub trailer: Trailer,
    /// Per-record errors skipped in lenient mode; always empty otherwise
    pub warnings: Vec<Error>,
}

impl BinaryCookies {
    /// Decode a container with default (strict) options.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        Self::parse_with(data, &ParseOptions::default())
    }

    /// Decode a container.
    pub fn parse_with(data: &[u8], options: &ParseOptions) -> Result<Self, Error> {
        let table = page::split(data)?;

        let mut cookies = Vec::new();
        let mut warnings = Vec::new();
        for (index, span) in table.spans.iter().enumerate() {
            let bytes = span
                .start
                .checked_add(span.len)
                .and_then(|end| data.get(span.start..end))
                .ok_or(Error::PageTruncated {
                    page: index,
                    declared: span.len,
                    available: data.len().saturating_sub(span.start.min(data.len())),
                })?;
            page::walk(index, bytes, options.lenient, &mut cookies, &mut warnings)?;
        }

        let trailer = trailer::locate(data, table.trailer_boundary);

        Ok(BinaryCookies {
            cookies,
            trailer,
            warnings,
        })
    }
}

/// Decode a container with default (strict) options.
pub fn parse(data: &[u8]) -> Result<BinaryCookies, Error> {
    BinaryCookies::parse(data)
}

/// Decode a container with explicit options.
pub fn parse_with(data: &[u8], options: &ParseOptions) -> Result<BinaryCookies, Error> {
    BinaryCookies::parse_with(data, options)
}
