use crate::plan;

/// Channel capacity for pending chunk descriptors.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Worker threads. Defaults to the hardware parallelism.
    pub workers: usize,
    /// Candidate chunk size in bytes. Defaults to 16 pages.
    pub chunk_size: usize,
    /// Bound on chunk descriptors queued ahead of the workers.
    pub queue_capacity: usize,
    /// Reject malformed records instead of assuming the input is well formed.
    pub validate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            chunk_size: plan::default_chunk_size(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            validate: false,
        }
    }
}

impl Options {
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    pub fn chunk_pages(self, pages: usize) -> Self {
        self.chunk_size(pages.saturating_mul(plan::page_size()))
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}
