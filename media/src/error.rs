use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The file does not start with the DKIF signature.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Only IVF version 0 containers are supported.
    #[error("unknown IVF version")]
    UnknownIvfVersion,

    /// The stream ended inside a 12-byte frame header.
    #[error("incomplete frame header")]
    IncompleteFrameHeader,

    /// The stream ended inside a frame payload.
    #[error("incomplete frame data")]
    IncompleteFrameData,

    /// The stream is fully drained.
    #[error("EOF")]
    Eof,

    #[error("{0}")]
    Io(#[source] IoError),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

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
