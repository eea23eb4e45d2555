use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Cumulative packets lost does not fit the signed 24-bit field.
    #[error("invalid total lost count")]
    InvalidTotalLost,

    /// Version, count, or length field of the header is invalid.
    #[error("invalid header")]
    InvalidHeader,

    /// A compound packet carries no packets at all.
    #[error("empty compound packet")]
    EmptyCompound,

    /// A compound packet must start with a sender or receiver report.
    #[error("first packet in compound must be SR or RR")]
    BadFirstPacket,

    /// A compound packet must carry a SourceDescription with a CNAME.
    #[error("compound missing SourceDescription with CNAME")]
    MissingCname,

    /// A feedback packet appeared before the CNAME.
    #[error("feedback packet seen before CNAME")]
    PacketBeforeCname,

    /// The 5-bit count field caps reports at 31 per packet.
    #[error("too many reports")]
    TooManyReports,

    /// The 5-bit count field caps chunks at 31 per packet.
    #[error("too many chunks")]
    TooManyChunks,

    /// The 5-bit count field caps sources at 31 per packet.
    #[error("too many sources")]
    TooManySources,

    /// The buffer ended before the advertised packet length.
    #[error("packet too short")]
    PacketTooShort,

    /// The packet was dispatched to the wrong concrete variant.
    #[error("wrong packet type")]
    WrongType,

    /// SDES item text is limited to 255 octets by its length byte.
    #[error("SDES must be < 255 octets long")]
    SdesTextTooLong,

    /// An SDES item is missing its type octet.
    #[error("SDES item missing type")]
    SdesMissingType,

    /// The BYE reason is limited to 255 octets by its length byte.
    #[error("reason must be < 255 octets long")]
    ReasonTooLong,

    /// RTCP packets always carry version 2.
    #[error("invalid packet version")]
    BadVersion,

    /// SDES text and BYE reasons must be valid UTF-8.
    #[error("invalid UTF-8 text")]
    InvalidUtf8,

    /// A stream ended inside a packet header.
    #[error("unexpected EOF")]
    UnexpectedEof,

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
