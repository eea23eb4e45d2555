
use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};

/// The kind of server an ICE URL points at.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SchemeType {
    /// A STUN server (RFC 7064).
    Stun,

    /// A STUN server reached over TLS.
    Stuns,

    /// A TURN server (RFC 7065). Accepted syntactically; relay
    /// allocation is reserved.
    Turn,

    /// A TURN server reached over TLS.
    Turns,

    #[default]
    Unknown,
}

impl From<&str> for SchemeType {
    fn from(raw: &str) -> Self {
        match raw {
            "stun" => Self::Stun,
            "stuns" => Self::Stuns,
            "turn" => Self::Turn,
            "turns" => Self::Turns,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemeType::Stun => "stun",
            SchemeType::Stuns => "stuns",
            SchemeType::Turn => "turn",
            SchemeType::Turns => "turns",
            SchemeType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// The transport named by the `?transport=` query of turn/turns URLs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProtoType {
    Udp,
    Tcp,
    Unknown,
}

impl Default for ProtoType {
    fn default() -> Self {
        Self::Udp
    }
}

impl From<&str> for ProtoType {
    fn from(raw: &str) -> Self {
        match raw {
            "udp" => Self::Udp,
            "tcp" => Self::Tcp,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtoType::Udp => "udp",
            ProtoType::Tcp => "tcp",
            ProtoType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// A STUN (RFC 7064) or TURN (RFC 7065) server URL.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: SchemeType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub proto: ProtoType,
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = if self.host.contains("::") {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if matches!(self.scheme, SchemeType::Turn | SchemeType::Turns) {
            write!(
                f,
                "{}:{}:{}?transport={}",
                self.scheme, host, self.port, self.proto
            )
        } else {
            write!(f, "{}:{}:{}", self.scheme, host, self.port)
        }
    }
}

impl Url {
    /// Parses a STUN or TURN URL following the ABNF of RFC 7064 and
    /// RFC 7065.
    pub fn parse_url(raw: &str) -> Result<Self> {
        // The url crate wants authority URLs; rewrite `scheme:rest`
        // into `scheme://rest` first. A raw `//` means the caller
        // already passed an authority form, which the grammar forbids.
        if raw.contains("//") {
            return Err(Error::ErrInvalidUrl);
        }

        let mut s = raw.to_string();
        match raw.find(':') {
            Some(pos) => s.replace_range(pos..=pos, "://"),
            None => return Err(Error::ErrSchemeType),
        };

        let parts = url::Url::parse(&s)?;

        let scheme: SchemeType = parts.scheme().into();

        let host = parts
            .host_str()
            .ok_or(Error::ErrHost)?
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_owned();
        if host.is_empty() {
            return Err(Error::ErrHost);
        }

        let port = match parts.port() {
            Some(port) => port,
            None if matches!(scheme, SchemeType::Stun | SchemeType::Turn) => 3478,
            None => 5349,
        };

        let mut queries = parts.query_pairs();
        let proto = match scheme {
            SchemeType::Stun | SchemeType::Stuns => {
                if queries.count() > 0 {
                    return Err(Error::ErrStunQuery);
                }
                if scheme == SchemeType::Stun {
                    ProtoType::Udp
                } else {
                    ProtoType::Tcp
                }
            }
            SchemeType::Turn | SchemeType::Turns => {
                if queries.count() > 1 {
                    return Err(Error::ErrInvalidQuery);
                }
                match queries.next() {
                    Some((key, value)) if key == Cow::Borrowed("transport") => {
                        let proto: ProtoType = value.as_ref().into();
                        if proto == ProtoType::Unknown {
                            return Err(Error::ErrProtoType);
                        }
                        proto
                    }
                    Some(_) => return Err(Error::ErrInvalidQuery),
                    None if scheme == SchemeType::Turn => ProtoType::Udp,
                    None => ProtoType::Tcp,
                }
            }
            SchemeType::Unknown => return Err(Error::ErrSchemeType),
        };

        Ok(Url {
            scheme,
            host,
            port,
            username: String::new(),
            password: String::new(),
            proto,
        })
    }

    /// Returns whether the scheme uses TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        matches!(self.scheme, SchemeType::Stuns | SchemeType::Turns)
    }
}
