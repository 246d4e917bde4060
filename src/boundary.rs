use memchr::memchr;

use crate::plan::ByteRange;

pub const TERMINATOR: u8 = b'\n';

/// First record boundary at or after `pos`: the byte following the next
/// terminator found at or after `pos`, or the end of the buffer.
#[inline]
fn boundary_after(buf: &[u8], pos: usize) -> usize {
    if pos >= buf.len() {
        return buf.len();
    }
    match memchr(TERMINATOR, &buf[pos..]) {
        Some(i) => pos + i + 1,
        None => buf.len(),
    }
}

/// Snaps a candidate range onto record boundaries.
///
/// A chunk that starts mid-record gives that record to its predecessor, and
/// a chunk that ends mid-record finishes it. Both ends use the same rule, so
/// resolving consecutive candidates tiles the buffer exactly. A candidate that
/// lies inside a single record resolves to an empty range.
pub fn resolve(buf: &[u8], candidate: ByteRange) -> ByteRange {
    let start = if candidate.start == 0 {
        0
    } else {
        boundary_after(buf, candidate.start)
    };
    let end = boundary_after(buf, candidate.end);
    ByteRange::new(start, end.max(start))
}
