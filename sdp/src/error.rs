use std::num::ParseIntError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A line arrived out of order, a singleton line repeated, or a
    /// line did not fit the `x=value` shape.
    #[error("sdp: invalid syntax `{0}`")]
    SdpInvalidSyntax(String),

    /// A field inside an otherwise well-placed line carried a value
    /// outside its registered set.
    #[error("sdp: invalid value `{0}`")]
    SdpInvalidValue(String),

    /// `r=` or a media line arrived before any `t=` / `m=` line.
    #[error("sdp: empty time description")]
    SdpEmptyTimeDescription,

    /// rtpmap/fmtp/rtcp-fb attribute missing its space separator.
    #[error("sdp: missing whitespace")]
    MissingWhitespace,

    /// rtpmap/fmtp/rtcp-fb attribute missing its colon separator.
    #[error("sdp: missing colon")]
    MissingColon,

    #[error("sdp: payload type not found")]
    PayloadTypeNotFound,

    #[error("sdp: codec not found")]
    CodecNotFound,

    #[error("parse int: {0}")]
    ParseInt(#[from] ParseIntError),

    #[error("parse url: {0}")]
    ParseUrl(#[from] url::ParseError),
}
