//! Cookie record decoding
//!
//! Each record is an offset-addressed structure: a fixed header carrying
//! flags, a port-presence marker, four field offsets and two timestamps,
//! followed by the null-terminated text fields the offsets point at.
//!
//! Stored field offsets are relative to the 4-byte size word that precedes
//! the record body, so every offset is applied as `offset - 4` against the
//! body-local cursor. The skip/read sequence below is the byte layout of
//! the format; reordering any step consumes the wrong bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cursor::Cursor;
use crate::Error;

/// Seconds between the Unix epoch and the Mac epoch (2001-01-01T00:00:00Z)
pub const MAC_EPOCH_OFFSET: i64 = 978_307_200;

/// Protocol restriction flags stored on each cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookieFlags {
    None,
    Https,
    Http,
    HttpsAndHttp,
    /// Any bit pattern other than 0/1/4/5, preserved for diagnostics
    Unknown(i32),
}

impl CookieFlags {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => CookieFlags::None,
            1 => CookieFlags::Https,
            4 => CookieFlags::Http,
            5 => CookieFlags::HttpsAndHttp,
            other => CookieFlags::Unknown(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            CookieFlags::None => 0,
            CookieFlags::Https => 1,
            CookieFlags::Http => 4,
            CookieFlags::HttpsAndHttp => 5,
            CookieFlags::Unknown(raw) => *raw,
        }
    }
}

impl fmt::Display for CookieFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieFlags::None => write!(f, "None"),
            CookieFlags::Https => write!(f, "HTTPS"),
            CookieFlags::Http => write!(f, "HTTP"),
            CookieFlags::HttpsAndHttp => write!(f, "HTTPS and HTTP"),
            CookieFlags::Unknown(raw) => write!(f, "Unknown ({raw})"),
        }
    }
}

/// One decoded cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub domain: String,
    pub name: String,
    pub path: String,
    pub value: String,
    pub flags: CookieFlags,
    /// Raw port-presence marker, preserved but not interpreted
    pub has_port: u32,
    /// Creation time in seconds since the Mac epoch
    pub create_time: f64,
    /// Expiry time in seconds since the Mac epoch
    pub expiry_time: f64,
}

impl CookieRecord {
    /// Creation time as Unix seconds
    pub fn create_unix(&self) -> f64 {
        self.create_time + MAC_EPOCH_OFFSET as f64
    }

    /// Expiry time as Unix seconds
    pub fn expiry_unix(&self) -> f64 {
        self.expiry_time + MAC_EPOCH_OFFSET as f64
    }

    /// Creation time as a calendar instant, when representable
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.create_unix() as i64, 0)
    }

    /// Expiry time as a calendar instant, when representable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expiry_unix() as i64, 0)
    }
}

/// Decode one cookie record from its body bytes (the slice following the
/// record's 4-byte size word). `page` and `cookie` are carried for error
/// context only.
pub(crate) fn decode_record(
    body: &[u8],
    page: usize,
    cookie: usize,
) -> Result<CookieRecord, Error> {
    let mut cur = Cursor::new(body);
    let trunc = |source| Error::CookieTruncated {
        page,
        cookie,
        source,
    };

    cur.skip(4).map_err(trunc)?; // reserved word
    let flags = CookieFlags::from_raw(cur.read_i32_le().map_err(trunc)?);
    let has_port = cur.read_u32_le().map_err(trunc)?;

    let url_offset = cur.read_i32_le().map_err(trunc)?;
    let name_offset = cur.read_i32_le().map_err(trunc)?;
    let path_offset = cur.read_i32_le().map_err(trunc)?;
    let value_offset = cur.read_i32_le().map_err(trunc)?;

    cur.skip(8).map_err(trunc)?; // end of fixed header

    // expiry is stored before creation
    let expiry_time = cur.read_f64_le().map_err(trunc)?;
    let create_time = cur.read_f64_le().map_err(trunc)?;

    let domain = read_field(&mut cur, url_offset, "domain", page, cookie, false)?;
    let name = read_field(&mut cur, name_offset, "name", page, cookie, true)?;
    let path = read_field(&mut cur, path_offset, "path", page, cookie, false)?;
    let value = read_field(&mut cur, value_offset, "value", page, cookie, true)?;

    Ok(CookieRecord {
        domain,
        name,
        path,
        value,
        flags,
        has_port,
        create_time,
        expiry_time,
    })
}

/// Seek to a stored field offset (minus the size-word correction) and read
/// the null-terminated text there. `unescape` applies percent-decoding,
/// gated on the raw text actually containing a `%`.
fn read_field(
    cur: &mut Cursor<'_>,
    offset: i32,
    field: &'static str,
    page: usize,
    cookie: usize,
    unescape: bool,
) -> Result<String, Error> {
    let target = i64::from(offset) - 4;
    if target < 0 || target >= cur.len() as i64 {
        return Err(Error::OffsetOutOfRange {
            page,
            cookie,
            field,
            offset,
            len: cur.len(),
        });
    }
    cur.seek(target).map_err(|source| Error::CookieTruncated {
        page,
        cookie,
        source,
    })?;
    let text = cur.read_cstring().map_err(|_| Error::FieldUnterminated {
        page,
        cookie,
        field,
    })?;

    if unescape && text.contains('%') {
        // invalid escape sequences pass through untouched
        let decoded = urlencoding::decode_binary(text.as_bytes());
        Ok(String::from_utf8_lossy(&decoded).into_owned())
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_mapping_is_exhaustive() {
        assert_eq!(CookieFlags::from_raw(0), CookieFlags::None);
        assert_eq!(CookieFlags::from_raw(1), CookieFlags::Https);
        assert_eq!(CookieFlags::from_raw(4), CookieFlags::Http);
        assert_eq!(CookieFlags::from_raw(5), CookieFlags::HttpsAndHttp);
        assert_eq!(CookieFlags::from_raw(2), CookieFlags::Unknown(2));
        assert_eq!(CookieFlags::from_raw(7), CookieFlags::Unknown(7));
        assert_eq!(CookieFlags::from_raw(-1), CookieFlags::Unknown(-1));
    }

    #[test]
    fn test_flags_raw_round_trip() {
        for raw in [0, 1, 4, 5, 2, 7, 255] {
            assert_eq!(CookieFlags::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn test_flags_labels() {
        assert_eq!(CookieFlags::HttpsAndHttp.to_string(), "HTTPS and HTTP");
        assert_eq!(CookieFlags::Unknown(9).to_string(), "Unknown (9)");
    }

    #[test]
    fn test_epoch_conversion() {
        let record = CookieRecord {
            domain: "example.com".into(),
            name: "sid".into(),
            path: "/".into(),
            value: "abc".into(),
            flags: CookieFlags::None,
            has_port: 0,
            create_time: 0.0,
            expiry_time: 1.0,
        };

        assert_eq!(record.create_unix(), 978_307_200.0);
        assert_eq!(record.expiry_unix(), 978_307_201.0);

        let created = record.created_at().unwrap();
        assert_eq!(created.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    }
}
