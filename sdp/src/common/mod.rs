use std::fmt;

pub(crate) const END_LINE: &str = "\r\n";

/// Writes `key` + `value` + CRLF when a value is present.
pub(crate) fn write_key_value<W: fmt::Write, V: fmt::Display>(
    writer: &mut W,
    key: &str,
    value: Option<&V>,
) -> fmt::Result {
    let Some(value) = value else {
        return Ok(());
    };
    write!(writer, "{key}{value}{END_LINE}")
}

/// Information describes the "i=" field which provides textual
/// information about the session.
pub type Information = String;

/// EncryptionKey describes the "k=" field which conveys encryption key
/// information.
pub type EncryptionKey = String;

/// ConnectionInformation defines the representation for the "c=" field
/// containing connection data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionInformation {
    pub network_type: String,
    pub address_type: String,
    pub address: Option<Address>,
}

impl fmt::Display for ConnectionInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.network_type, self.address_type)?;
        if let Some(address) = &self.address {
            write!(f, " {address}")?;
        }
        Ok(())
    }
}

/// Address is the structured connection-address token of the "c="
/// field; multicast IPv4 addresses carry a `/ttl` suffix, IPv6
/// multicast addresses a `/range`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Address {
    pub address: String,
    pub ttl: Option<isize>,
    pub range: Option<isize>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        if let Some(ttl) = self.ttl {
            write!(f, "/{ttl}")?;
        }
        if let Some(range) = self.range {
            write!(f, "/{range}")?;
        }
        Ok(())
    }
}

/// Bandwidth describes the "b=" field, a proposed bandwidth for the
/// session or media. `X-`-prefixed types are experimental.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bandwidth {
    pub experimental: bool,
    pub bandwidth_type: String,
    pub bandwidth: u64,
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.experimental { "X-" } else { "" };
        write!(f, "{}{}:{}", prefix, self.bandwidth_type, self.bandwidth)
    }
}

/// Attribute describes an "a=" line, either a property (`a=recvonly`)
/// or a value (`a=rtpmap:96 VP8/90000`). Unknown keys are preserved
/// opaquely.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

impl Attribute {
    pub fn new(key: String, value: Option<String>) -> Self {
        Attribute { key, value }
    }

    /// Returns true for `a=candidate:...` lines.
    pub fn is_ice_candidate(&self) -> bool {
        self.key == "candidate"
    }
}
