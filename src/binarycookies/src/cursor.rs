//! Bounds-checked cursor over an in-memory byte buffer
//!
//! All container parsing goes through [`Cursor`]: fixed-width big/little
//! endian integer and float reads, absolute seeks, and null-terminated
//! text reads. Every failure is a typed [`CursorError`] that the page and
//! cookie layers wrap with positional context.

use memchr::memchr;

/// Errors raised by raw buffer reads
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("wanted {wanted} bytes at offset {at}, only {available} available")]
    Truncated {
        at: usize,
        wanted: usize,
        available: usize,
    },

    #[error("seek to negative offset {0}")]
    NegativeSeek(i64),

    #[error("no null terminator between offset {from} and end of buffer")]
    Unterminated { from: usize },
}

/// Reader over a borrowed byte slice with an explicit position
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Read the next `n` bytes and advance
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        let end = self.pos.checked_add(n).ok_or(CursorError::Truncated {
            at: self.pos,
            wanted: n,
            available: self.remaining(),
        })?;
        let out = self
            .data
            .get(self.pos..end)
            .ok_or(CursorError::Truncated {
                at: self.pos,
                wanted: n,
                available: self.remaining(),
            })?;
        self.pos = end;
        Ok(out)
    }

    /// Advance past `n` bytes without looking at them
    pub fn skip(&mut self, n: usize) -> Result<(), CursorError> {
        self.read_exact(n).map(|_| ())
    }

    /// Signed 4-byte big-endian integer
    pub fn read_i32_be(&mut self) -> Result<i32, CursorError> {
        let b = self.read_exact(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Signed 4-byte little-endian integer
    pub fn read_i32_le(&mut self) -> Result<i32, CursorError> {
        let b = self.read_exact(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Unsigned 4-byte little-endian integer
    pub fn read_u32_le(&mut self) -> Result<u32, CursorError> {
        let b = self.read_exact(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 8-byte little-endian IEEE-754 float
    pub fn read_f64_le(&mut self) -> Result<f64, CursorError> {
        let b = self.read_exact(8)?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reposition to an absolute offset. A negative target is an error;
    /// a target past the end is allowed and surfaces as a truncated read
    /// on the next access.
    pub fn seek(&mut self, target: i64) -> Result<(), CursorError> {
        if target < 0 {
            return Err(CursorError::NegativeSeek(target));
        }
        self.pos = target as usize;
        Ok(())
    }

    /// Read bytes up to (and consuming) a null terminator, decoding the
    /// accumulated bytes as text. Running out of buffer before the
    /// terminator is an error, not an implicit end-of-string.
    pub fn read_cstring(&mut self) -> Result<String, CursorError> {
        let start = self.pos.min(self.data.len());
        let rel = memchr(0, &self.data[start..])
            .ok_or(CursorError::Unterminated { from: self.pos })?;
        let text = String::from_utf8_lossy(&self.data[start..start + rel]).into_owned();
        self.pos = start + rel + 1;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_reads() {
        let data = [0x00, 0x00, 0x01, 0x00, 0x05, 0x00, 0x00, 0x00];
        let mut cur = Cursor::new(&data);

        assert_eq!(cur.read_i32_be(), Ok(256));
        assert_eq!(cur.read_i32_le(), Ok(5));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_float_read() {
        let mut data = Vec::new();
        data.extend_from_slice(&682935433.0f64.to_le_bytes());
        let mut cur = Cursor::new(&data);

        assert_eq!(cur.read_f64_le(), Ok(682935433.0));
    }

    #[test]
    fn test_truncated_read() {
        let data = [0x01, 0x02];
        let mut cur = Cursor::new(&data);

        assert_eq!(
            cur.read_i32_le(),
            Err(CursorError::Truncated {
                at: 0,
                wanted: 4,
                available: 2,
            })
        );
        // a failed read does not advance
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn test_seek() {
        let data = [0u8; 8];
        let mut cur = Cursor::new(&data);

        assert!(cur.seek(6).is_ok());
        assert_eq!(cur.pos(), 6);
        assert_eq!(cur.seek(-1), Err(CursorError::NegativeSeek(-1)));

        // seeking past the end is deferred to the next read
        assert!(cur.seek(100).is_ok());
        assert!(matches!(
            cur.read_exact(1),
            Err(CursorError::Truncated { .. })
        ));
    }

    #[test]
    fn test_read_cstring() {
        let data = b"example.com\0sid\0";
        let mut cur = Cursor::new(data);

        assert_eq!(cur.read_cstring().as_deref(), Ok("example.com"));
        assert_eq!(cur.pos(), 12);
        assert_eq!(cur.read_cstring().as_deref(), Ok("sid"));
    }

    #[test]
    fn test_read_cstring_unterminated() {
        let data = b"no-null-here";
        let mut cur = Cursor::new(data);

        assert_eq!(
            cur.read_cstring(),
            Err(CursorError::Unterminated { from: 0 })
        );
    }
}
