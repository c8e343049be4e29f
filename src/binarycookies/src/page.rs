//! Page-table walking
//!
//! The container header declares a page count and a big-endian size table;
//! the pages follow back to back. Each page carries its own little-endian
//! cookie-offset table addressing size-prefixed cookie records.
//!
//! Page slicing is purely size-driven: the size table is taken at face
//! value and an undersized buffer only fails once the page content is
//! actually sliced, not while the table is read.

use crate::cookie::{self, CookieRecord};
use crate::cursor::Cursor;
use crate::{Error, MAGIC};

/// Declared byte range of one page within the container
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageSpan {
    pub start: usize,
    pub len: usize,
}

/// Result of reading the container header and page-size table
#[derive(Debug)]
pub(crate) struct PageTable {
    pub spans: Vec<PageSpan>,
    /// First byte after the page data plus the 12-byte checksum/footer
    /// block; anything beyond this is trailer territory.
    pub trailer_boundary: usize,
}

/// Read the magic, page count and size table, and lay out the page spans.
pub(crate) fn split(data: &[u8]) -> Result<PageTable, Error> {
    if !data.starts_with(&MAGIC) {
        let mut found = [0u8; 4];
        let head = data.get(..data.len().min(4)).unwrap_or_default();
        found[..head.len()].copy_from_slice(head);
        return Err(Error::MalformedHeader { found });
    }

    let mut cur = Cursor::new(data);
    cur.skip(4)
        .map_err(|source| Error::PageTableTruncated { source })?;

    let page_count = cur
        .read_i32_be()
        .map_err(|source| Error::PageTableTruncated { source })?;
    let page_count =
        usize::try_from(page_count).map_err(|_| Error::NegativePageCount(page_count))?;

    // a declared count can be anything up to i32::MAX; never reserve more
    // than the remaining bytes could actually hold
    let mut sizes = Vec::with_capacity(page_count.min(cur.remaining() / 4));
    for page in 0..page_count {
        let size = cur
            .read_i32_be()
            .map_err(|source| Error::PageTableTruncated { source })?;
        let size = usize::try_from(size).map_err(|_| Error::NegativePageSize { page, size })?;
        sizes.push(size);
    }

    let page_bytes: usize = sizes.iter().sum();
    // magic + page count + size table + pages + 4-byte checksum and
    // 8-byte footer signature
    let trailer_boundary = 8 + 4 * page_count + page_bytes + 12;

    let mut spans = Vec::with_capacity(page_count);
    let mut start = cur.pos();
    for len in sizes {
        spans.push(PageSpan { start, len });
        start += len;
    }

    Ok(PageTable {
        spans,
        trailer_boundary,
    })
}

/// Decode every cookie in one page, in offset-table order.
///
/// In lenient mode a failing record is skipped and its error pushed onto
/// `warnings`; the page-level offset table itself is never recovered from.
pub(crate) fn walk(
    page: usize,
    bytes: &[u8],
    lenient: bool,
    cookies: &mut Vec<CookieRecord>,
    warnings: &mut Vec<Error>,
) -> Result<(), Error> {
    let mut cur = Cursor::new(bytes);
    let trunc = |source| Error::CookieTableTruncated { page, source };

    cur.skip(4).map_err(trunc)?; // page header word, any value accepted

    let count = cur.read_i32_le().map_err(trunc)?;
    let count = usize::try_from(count).map_err(|_| Error::NegativeCookieCount { page, count })?;

    let mut offsets = Vec::with_capacity(count.min(cur.remaining() / 4));
    for _ in 0..count {
        offsets.push(cur.read_i32_le().map_err(trunc)?);
    }

    cur.skip(4).map_err(trunc)?; // page footer word, any value accepted

    for (index, offset) in offsets.into_iter().enumerate() {
        match read_record(bytes, offset, page, index) {
            Ok(record) => cookies.push(record),
            Err(err) if lenient => warnings.push(err),
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Slice and decode the size-prefixed record at one offset-table entry.
fn read_record(
    bytes: &[u8],
    offset: i32,
    page: usize,
    cookie: usize,
) -> Result<CookieRecord, Error> {
    let mut cur = Cursor::new(bytes);
    cur.seek(i64::from(offset))
        .map_err(|_| Error::NegativeCookieOffset {
            page,
            cookie,
            offset,
        })?;

    let size = cur
        .read_i32_le()
        .map_err(|source| Error::CookieTruncated {
            page,
            cookie,
            source,
        })?;
    let size = usize::try_from(size).map_err(|_| Error::NegativeCookieSize {
        page,
        cookie,
        size,
    })?;

    let body = cur.read_exact(size).map_err(|source| Error::CookieTruncated {
        page,
        cookie,
        source,
    })?;

    cookie::decode_record(body, page, cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_magic() {
        let err = split(b"kooc\x00\x00\x00\x00").unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { found } if &found == b"kooc"));
    }

    #[test]
    fn test_rejects_short_file() {
        assert!(matches!(split(b"co"), Err(Error::MalformedHeader { .. })));
    }

    #[test]
    fn test_zero_pages_boundary() {
        let mut data = Vec::new();
        data.extend_from_slice(b"cook");
        data.extend_from_slice(&0i32.to_be_bytes());

        let table = split(&data).unwrap();
        assert!(table.spans.is_empty());
        // magic + count + checksum/footer block only
        assert_eq!(table.trailer_boundary, 20);
    }

    #[test]
    fn test_span_layout() {
        let mut data = Vec::new();
        data.extend_from_slice(b"cook");
        data.extend_from_slice(&2i32.to_be_bytes());
        data.extend_from_slice(&10i32.to_be_bytes());
        data.extend_from_slice(&30i32.to_be_bytes());
        // spans are laid out from the size table alone, even though no
        // page bytes are present yet
        let table = split(&data).unwrap();

        assert_eq!(table.spans.len(), 2);
        assert_eq!((table.spans[0].start, table.spans[0].len), (16, 10));
        assert_eq!((table.spans[1].start, table.spans[1].len), (26, 30));
        assert_eq!(table.trailer_boundary, 8 + 8 + 40 + 12);
    }

    #[test]
    fn test_truncated_size_table() {
        let mut data = Vec::new();
        data.extend_from_slice(b"cook");
        data.extend_from_slice(&3i32.to_be_bytes());
        data.extend_from_slice(&10i32.to_be_bytes()); // two entries missing

        assert!(matches!(
            split(&data),
            Err(Error::PageTableTruncated { .. })
        ));
    }

    #[test]
    fn test_huge_page_count_in_tiny_file() {
        // 12-byte file declaring i32::MAX pages must fail on the size
        // table read, without reserving gigabytes up front
        let mut data = Vec::new();
        data.extend_from_slice(b"cook");
        data.extend_from_slice(&i32::MAX.to_be_bytes());
        data.extend_from_slice(&10i32.to_be_bytes());

        assert!(matches!(
            split(&data),
            Err(Error::PageTableTruncated { .. })
        ));
    }

    #[test]
    fn test_huge_cookie_count_in_tiny_page() {
        let mut page = Vec::new();
        page.extend_from_slice(&[0u8; 4]); // header word
        page.extend_from_slice(&i32::MAX.to_le_bytes());
        page.extend_from_slice(&[0u8; 4]); // one offset, rest missing

        let mut cookies = Vec::new();
        let mut warnings = Vec::new();
        let err = walk(0, &page, false, &mut cookies, &mut warnings).unwrap_err();
        assert!(matches!(err, Error::CookieTableTruncated { page: 0, .. }));
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_negative_page_count() {
        let mut data = Vec::new();
        data.extend_from_slice(b"cook");
        data.extend_from_slice(&(-2i32).to_be_bytes());

        assert!(matches!(split(&data), Err(Error::NegativePageCount(-2))));
    }
}
