/// Half-open span `[start, end)` of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Pages per candidate chunk.
pub const CHUNK_PAGES: usize = 16;

const FALLBACK_PAGE_SIZE: usize = 4096;

pub fn page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            return size as usize;
        }
    }
    FALLBACK_PAGE_SIZE
}

pub fn default_chunk_size() -> usize {
    page_size() * CHUNK_PAGES
}

/// Lazily yields `[0,S), [S,2S), ..., [kS, L)`.
///
/// Candidates are not record aligned; see [`crate::boundary::resolve`].
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    len: usize,
    chunk_size: usize,
    next: usize,
}

impl ChunkPlan {
    pub fn new(len: usize, chunk_size: usize) -> Self {
        Self {
            len,
            chunk_size: chunk_size.max(1),
            next: 0,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.len.div_ceil(self.chunk_size)
    }
}

impl Iterator for ChunkPlan {
    type Item = ByteRange;

    fn next(&mut self) -> Option<ByteRange> {
        if self.next >= self.len {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.chunk_size).min(self.len);
        self.next = end;
        Some(ByteRange::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.len - self.next.min(self.len)).div_ceil(self.chunk_size);
        (left, Some(left))
    }
}

impl ExactSizeIterator for ChunkPlan {}
