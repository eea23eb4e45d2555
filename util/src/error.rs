use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The buffer hit its configured count or size limit.
    #[error("buffer: full")]
    BufferFull,

    /// The buffer was closed and is fully drained.
    #[error("buffer: closed")]
    BufferClosed,

    /// The caller's slice is smaller than the packet at the head of the
    /// buffer. The packet is dropped.
    #[error("buffer: short buffer")]
    BufferShort,

    /// Packets larger than 65535 bytes are never buffered.
    #[error("packet too big")]
    PacketTooBig,

    #[error("i/o timeout")]
    Timeout,

    #[error("{0}")]
    Io(#[source] IoError),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// io::Error has no PartialEq, compare by kind.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}
