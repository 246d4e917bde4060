use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};

/// Read-only view of a whole file, backed by the page cache rather than a heap copy.
///
/// Zero-length files are never mapped; they expose an empty slice.
pub struct MappedInput {
    map: Option<Mmap>,
}

impl MappedInput {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len();
        if len == 0 {
            return Ok(Self { map: None });
        }

        // SAFETY: the mapping is only ever read. Truncating the file while a run
        // is in progress is outside the contract, as with any mmap reader.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?;
        #[cfg(unix)]
        {
            // Every byte is read once, front to back within each chunk.
            if let Err(e) = map.advise(memmap2::Advice::Sequential) {
                debug!(path = %path.display(), error = %e, "madvise(SEQUENTIAL) failed");
            }
        }
        Ok(Self { map: Some(map) })
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.map {
            Some(map) => map,
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Deref for MappedInput {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes()
    }
}
