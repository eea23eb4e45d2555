#[cfg(test)]
mod attributes_test;

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{Error, Result};
use crate::message::{TransactionId, MAGIC_COOKIE, TRANSACTION_ID_SIZE};

// Attribute type values from the comprehension-required range.
pub const ATTR_USERNAME: u16 = 0x0006; // USERNAME
pub const ATTR_MESSAGE_INTEGRITY: u16 = 0x0008; // MESSAGE-INTEGRITY
pub const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020; // XOR-MAPPED-ADDRESS
pub const ATTR_PRIORITY: u16 = 0x0024; // PRIORITY (RFC 5245)
pub const ATTR_USE_CANDIDATE: u16 = 0x0025; // USE-CANDIDATE (RFC 5245)

// Attribute type values from the comprehension-optional range.
pub const ATTR_FINGERPRINT: u16 = 0x8028; // FINGERPRINT
pub const ATTR_ICE_CONTROLLED: u16 = 0x8029; // ICE-CONTROLLED (RFC 5245)
pub const ATTR_ICE_CONTROLLING: u16 = 0x802A; // ICE-CONTROLLING (RFC 5245)

const FAMILY_IPV4: u16 = 0x01;
const FAMILY_IPV6: u16 = 0x02;

const IPV4_LEN: usize = 4;
const IPV6_LEN: usize = 16;

pub(crate) const PADDING: usize = 4;
pub(crate) const MESSAGE_INTEGRITY_SIZE: usize = 20;
pub(crate) const FINGERPRINT_SIZE: usize = 4;

/// Attributes are aligned on 32-bit boundaries; values whose length is
/// not a multiple of 4 are followed by 1-3 padding bytes.
pub(crate) fn nearest_padded_value_length(l: usize) -> usize {
    let mut n = PADDING * (l / PADDING);
    if n < l {
        n += PADDING;
    }
    n
}

/// A single decoded STUN attribute.
///
/// Unknown attribute types are preserved as [`Attribute::Other`] and
/// survive a parse/build round trip unchanged. `MessageIntegrity`
/// carries the HMAC-SHA1 key when a message is built and the received
/// 20-byte digest after a parse; `Fingerprint` is computed and checked
/// against the message bytes rather than carrying a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    XorMappedAddress { ip: IpAddr, port: u16 },
    Username(String),
    Priority(u32),
    UseCandidate,
    IceControlling(u64),
    IceControlled(u64),
    MessageIntegrity(Vec<u8>),
    Fingerprint,
    Other { typ: u16, value: Vec<u8> },
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::XorMappedAddress { ip, port } => match ip {
                IpAddr::V4(_) => write!(f, "XOR-MAPPED-ADDRESS: {ip}:{port}"),
                IpAddr::V6(_) => write!(f, "XOR-MAPPED-ADDRESS: [{ip}]:{port}"),
            },
            Attribute::Username(u) => write!(f, "USERNAME: {u}"),
            Attribute::Priority(p) => write!(f, "PRIORITY: {p}"),
            Attribute::UseCandidate => write!(f, "USE-CANDIDATE"),
            Attribute::IceControlling(t) => write!(f, "ICE-CONTROLLING: {t:#x}"),
            Attribute::IceControlled(t) => write!(f, "ICE-CONTROLLED: {t:#x}"),
            Attribute::MessageIntegrity(v) => write!(f, "MESSAGE-INTEGRITY: 0x{v:02x?}"),
            Attribute::Fingerprint => write!(f, "FINGERPRINT"),
            Attribute::Other { typ, value } => write!(f, "{typ:#06x}: {value:02x?}"),
        }
    }
}

impl Attribute {
    /// The wire attribute type value for this variant.
    pub fn typ(&self) -> u16 {
        match self {
            Attribute::XorMappedAddress { .. } => ATTR_XOR_MAPPED_ADDRESS,
            Attribute::Username(_) => ATTR_USERNAME,
            Attribute::Priority(_) => ATTR_PRIORITY,
            Attribute::UseCandidate => ATTR_USE_CANDIDATE,
            Attribute::IceControlling(_) => ATTR_ICE_CONTROLLING,
            Attribute::IceControlled(_) => ATTR_ICE_CONTROLLED,
            Attribute::MessageIntegrity(_) => ATTR_MESSAGE_INTEGRITY,
            Attribute::Fingerprint => ATTR_FINGERPRINT,
            Attribute::Other { typ, .. } => *typ,
        }
    }

    /// Encodes the attribute value. `MessageIntegrity` and
    /// `Fingerprint` are excluded: their values depend on the message
    /// bytes and are produced during [`crate::message::Message`]
    /// encoding.
    pub(crate) fn encode_value(&self, transaction_id: &TransactionId) -> Vec<u8> {
        match self {
            Attribute::XorMappedAddress { ip, port } => {
                encode_xor_address(*ip, *port, transaction_id)
            }
            Attribute::Username(u) => u.as_bytes().to_vec(),
            Attribute::Priority(p) => p.to_be_bytes().to_vec(),
            Attribute::UseCandidate => vec![],
            Attribute::IceControlling(t) | Attribute::IceControlled(t) => {
                t.to_be_bytes().to_vec()
            }
            Attribute::MessageIntegrity(_) | Attribute::Fingerprint => vec![],
            Attribute::Other { value, .. } => value.clone(),
        }
    }

    /// Decodes a raw TLV into its typed variant.
    pub(crate) fn decode(
        typ: u16,
        value: &[u8],
        transaction_id: &TransactionId,
    ) -> Result<Attribute> {
        match typ {
            ATTR_XOR_MAPPED_ADDRESS => {
                let (ip, port) = decode_xor_address(value, transaction_id)?;
                Ok(Attribute::XorMappedAddress { ip, port })
            }
            ATTR_USERNAME => Ok(Attribute::Username(
                String::from_utf8(value.to_vec())
                    .map_err(|_| Error::AttributeSizeInvalid)?,
            )),
            ATTR_PRIORITY => {
                let v: [u8; 4] = value.try_into().map_err(|_| Error::AttributeSizeInvalid)?;
                Ok(Attribute::Priority(u32::from_be_bytes(v)))
            }
            ATTR_USE_CANDIDATE => Ok(Attribute::UseCandidate),
            ATTR_ICE_CONTROLLING => {
                let v: [u8; 8] = value.try_into().map_err(|_| Error::AttributeSizeInvalid)?;
                Ok(Attribute::IceControlling(u64::from_be_bytes(v)))
            }
            ATTR_ICE_CONTROLLED => {
                let v: [u8; 8] = value.try_into().map_err(|_| Error::AttributeSizeInvalid)?;
                Ok(Attribute::IceControlled(u64::from_be_bytes(v)))
            }
            ATTR_MESSAGE_INTEGRITY => {
                if value.len() != MESSAGE_INTEGRITY_SIZE {
                    return Err(Error::AttributeSizeInvalid);
                }
                Ok(Attribute::MessageIntegrity(value.to_vec()))
            }
            ATTR_FINGERPRINT => {
                if value.len() != FINGERPRINT_SIZE {
                    return Err(Error::AttributeSizeInvalid);
                }
                Ok(Attribute::Fingerprint)
            }
            _ => Ok(Attribute::Other {
                typ,
                value: value.to_vec(),
            }),
        }
    }
}

fn xor_bytes(dst: &mut [u8], a: &[u8], b: &[u8]) {
    for (i, d) in dst.iter_mut().enumerate() {
        *d = a[i] ^ b[i];
    }
}

/// X-Port is the port XOR'd with the 16 most significant cookie bits;
/// X-Address is the IP XOR'd with the cookie (IPv4) or the cookie
/// concatenated with the transaction id (IPv6).
fn encode_xor_address(ip: IpAddr, port: u16, transaction_id: &TransactionId) -> Vec<u8> {
    let mut xor_pad = [0u8; IPV6_LEN];
    xor_pad[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    xor_pad[4..].copy_from_slice(&transaction_id.0);

    let (family, octets) = match ip {
        IpAddr::V4(v4) => (FAMILY_IPV4, v4.octets().to_vec()),
        IpAddr::V6(v6) => (FAMILY_IPV6, v6.octets().to_vec()),
    };

    let mut value = vec![0u8; 4 + octets.len()];
    value[..2].copy_from_slice(&family.to_be_bytes());
    value[2..4].copy_from_slice(&(port ^ (MAGIC_COOKIE >> 16) as u16).to_be_bytes());
    xor_bytes(&mut value[4..], &octets, &xor_pad);
    value
}

fn decode_xor_address(value: &[u8], transaction_id: &TransactionId) -> Result<(IpAddr, u16)> {
    if value.len() <= 4 {
        return Err(Error::UnexpectedEof);
    }

    let mut xor_pad = [0u8; 4 + TRANSACTION_ID_SIZE];
    xor_pad[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    xor_pad[4..].copy_from_slice(&transaction_id.0);

    let family = u16::from_be_bytes([value[0], value[1]]);
    let port = u16::from_be_bytes([value[2], value[3]]) ^ (MAGIC_COOKIE >> 16) as u16;

    match family {
        FAMILY_IPV4 => {
            if value[4..].len() < IPV4_LEN {
                return Err(Error::AttributeSizeInvalid);
            }
            let mut ip = [0u8; IPV4_LEN];
            xor_bytes(&mut ip, &value[4..4 + IPV4_LEN], &xor_pad);
            Ok((IpAddr::V4(Ipv4Addr::from(ip)), port))
        }
        FAMILY_IPV6 => {
            if value[4..].len() < IPV6_LEN {
                return Err(Error::AttributeSizeInvalid);
            }
            let mut ip = [0u8; IPV6_LEN];
            xor_bytes(&mut ip, &value[4..4 + IPV6_LEN], &xor_pad);
            Ok((IpAddr::V6(Ipv6Addr::from(ip)), port))
        }
        _ => Err(Error::InvalidAddressFamily),
    }
}
