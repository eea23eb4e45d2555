use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The buffer ended before a complete 20-byte message header.
    #[error("unexpected EOF: not enough bytes to read header")]
    UnexpectedHeaderEof,

    /// The buffer ended inside an attribute or before the advertised
    /// message length.
    #[error("unexpected EOF")]
    UnexpectedEof,

    /// The magic-cookie field did not carry 0x2112A442.
    #[error("{0:#010x} is not a valid magic cookie")]
    InvalidMagicCookie(u32),

    /// An attribute value had the wrong size for its type.
    #[error("attribute size is invalid")]
    AttributeSizeInvalid,

    /// XOR-MAPPED-ADDRESS carried a family other than IPv4 or IPv6.
    #[error("invalid address family")]
    InvalidAddressFamily,

    /// The requested attribute is not present in the message.
    #[error("attribute not found")]
    AttributeNotFound,

    /// MESSAGE-INTEGRITY did not match the HMAC computed with the
    /// provided key.
    #[error("integrity check failed")]
    IntegrityCheckFailure,

    /// FINGERPRINT did not match the CRC-32 of the message.
    #[error("fingerprint mismatch")]
    FingerprintMismatch,

    /// MESSAGE-INTEGRITY must be added before FINGERPRINT.
    #[error("FINGERPRINT before MESSAGE-INTEGRITY attribute")]
    FingerprintBeforeIntegrity,

    /// No matching response arrived inside the client deadline.
    #[error("transaction timed out")]
    TransactionTimeOut,

    #[error("{0}")]
    Io(#[source] IoError),

    #[error("{0}")]
    Other(String),
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
