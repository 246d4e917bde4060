use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only produced when record validation is switched on.
    #[error("malformed record at byte {offset}: {reason}")]
    Format { offset: usize, reason: &'static str },

    #[error("cannot start worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("worker {0} stopped before handing over its table")]
    Worker(usize),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
