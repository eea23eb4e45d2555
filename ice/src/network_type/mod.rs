
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};

/// The transport family of a candidate. TCP candidate types are
/// reserved but not implemented.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NetworkType {
    /// UDP over IPv4.
    Udp4,
    /// UDP over IPv6.
    Udp6,
}

impl Default for NetworkType {
    fn default() -> Self {
        Self::Udp4
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkType::Udp4 => "udp4",
            NetworkType::Udp6 => "udp6",
        };
        write!(f, "{s}")
    }
}

impl NetworkType {
    /// The transport token used in candidate attributes.
    pub fn network_short(&self) -> &'static str {
        "udp"
    }

    pub fn is_udp(&self) -> bool {
        true
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self, NetworkType::Udp4)
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, NetworkType::Udp6)
    }
}

/// Determines the candidate network type from a transport token and a
/// resolved IP.
pub fn determine_network_type(network: &str, ip: &IpAddr) -> Result<NetworkType> {
    if !network.to_lowercase().starts_with("udp") {
        return Err(Error::ErrDetermineNetworkType);
    }

    if ip.is_ipv4() {
        Ok(NetworkType::Udp4)
    } else {
        Ok(NetworkType::Udp6)
    }
}

pub fn create_addr(ip: IpAddr, port: u16) -> SocketAddr {
    SocketAddr::new(ip, port)
}

pub(crate) fn supported_network_types() -> Vec<NetworkType> {
    vec![NetworkType::Udp4]
}
