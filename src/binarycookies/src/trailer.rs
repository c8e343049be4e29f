//! Trailing binary-plist payload location
//!
//! Some containers append a serialized property list after the cookie
//! data and its checksum/footer block. The payload is only located and
//! sliced here, never interpreted.

use crate::BPLIST_MAGIC;

/// Outcome of probing for a trailing plist payload. None of these are
/// decode failures; a container with no trailer is perfectly valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailer {
    /// `bplist00` found at the boundary; payload runs to end of file
    Present(Vec<u8>),
    /// Bytes exist past the boundary but do not begin with `bplist00`
    SignatureMismatch,
    /// The container ends at or before the computed boundary
    NoRoom,
}

impl Trailer {
    /// The payload bytes, when a trailer is present
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Trailer::Present(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Probe the container for a plist payload beginning at `boundary`.
pub(crate) fn locate(data: &[u8], boundary: usize) -> Trailer {
    if data.len() <= boundary {
        return Trailer::NoRoom;
    }
    match data.get(boundary..boundary + 8) {
        Some(signature) if signature == BPLIST_MAGIC => {
            Trailer::Present(data[boundary..].to_vec())
        }
        // bytes after the boundary, but not a plist (or fewer than the
        // 8 signature bytes)
        _ => Trailer::SignatureMismatch,
    }
}
