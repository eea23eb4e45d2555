use std::net;
use std::num::ParseIntError;
use std::{io, time::SystemTimeError};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The scheme of an ICE server URL is not stun/stuns/turn/turns.
    #[error("unknown scheme type")]
    ErrSchemeType,

    /// stun/stuns URLs accept no query parameters at all.
    #[error("queries not supported in stun address")]
    ErrStunQuery,

    /// A turn/turns URL carries a query other than `transport`.
    #[error("invalid query")]
    ErrInvalidQuery,

    /// The URL host is missing or malformed.
    #[error("invalid hostname")]
    ErrHost,

    /// The URL port is malformed.
    #[error("invalid port number")]
    ErrPort,

    /// The `transport` parameter is neither udp nor tcp.
    #[error("invalid transport protocol type")]
    ErrProtoType,

    /// The URL did not survive the underlying parser.
    #[error("invalid url")]
    ErrInvalidUrl,

    /// No free port inside the configured [port_min, port_max] range.
    #[error("no port available in the configured range")]
    ErrNoPortAvailable,

    /// The agent has been closed; all further operations fail.
    #[error("the agent is closed")]
    ErrClosed,

    /// Write was attempted before any candidate pair became valid.
    #[error("no candidate pairs available")]
    ErrNoCandidatePairs,

    /// Dial/Accept was cancelled by the caller.
    #[error("connecting canceled by caller")]
    ErrCanceledByCaller,

    /// Dial/Accept was called more than once.
    #[error("attempted to start agent twice")]
    ErrMultipleStart,

    #[error("remote ufrag is empty")]
    ErrRemoteUfragEmpty,

    #[error("remote pwd is empty")]
    ErrRemotePwdEmpty,

    /// The ICE transport refuses to carry well-formed STUN packets as
    /// user payload.
    #[error("the ICE conn can't write STUN messages")]
    ErrIceWriteStunMessage,

    /// A candidate address failed to parse.
    #[error("failed to parse address")]
    ErrAddressParseFailed,

    #[error("attribute not long enough to be ICE candidate")]
    ErrAttributeTooShortIceCandidate,

    #[error("could not parse component")]
    ErrParseComponent,

    #[error("could not parse priority")]
    ErrParsePriority,

    #[error("could not parse port")]
    ErrParsePort,

    #[error("could not parse related addresses")]
    ErrParseRelatedAddr,

    #[error("could not parse type")]
    ErrParseType,

    #[error("unknown candidate type")]
    ErrUnknownCandidateType,

    #[error("unable to determine networkType")]
    ErrDetermineNetworkType,

    #[error("parse int: {0}")]
    ParseInt(#[from] ParseIntError),

    #[error("parse addr: {0}")]
    ParseIp(#[from] net::AddrParseError),

    #[error("{0}")]
    Io(#[source] IoError),

    #[error("{0}")]
    Util(#[from] util::Error),

    #[error("{0}")]
    Stun(#[from] stun::Error),

    #[error("{0}")]
    ParseUrl(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for io::Error not implementing PartialEq.
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

impl From<SystemTimeError> for Error {
    fn from(e: SystemTimeError) -> Self {
        Error::Other(e.to_string())
    }
}
