#[cfg(test)]
mod message_test;

use std::fmt;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use rand::Rng;

use crate::attributes::{nearest_padded_value_length, Attribute};
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint_value;
use crate::integrity::hmac_sha1;

// The magic cookie distinguishes STUN from other protocols multiplexed
// on the same port; it MUST carry 0x2112A442 in network byte order.
pub const MAGIC_COOKIE: u32 = 0x2112A442;
pub const MESSAGE_HEADER_SIZE: usize = 20;
pub const ATTRIBUTE_HEADER_SIZE: usize = 4;
pub const TRANSACTION_ID_SIZE: usize = 12; // 96 bit

/// Returns true if `b` plausibly holds a STUN message: the two class
/// bits confine the first byte below 2 and the magic cookie must be in
/// place. Used for first-byte demultiplexing; a true result does not
/// guarantee that decoding succeeds.
pub fn is_message(b: &[u8]) -> bool {
    b.len() >= MESSAGE_HEADER_SIZE
        && b[0] < 2
        && u32::from_be_bytes([b[4], b[5], b[6], b[7]]) == MAGIC_COOKIE
}

/// The 96-bit transaction identifier correlating requests with
/// responses.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    /// A fresh random transaction id.
    pub fn new() -> Self {
        let mut id = TransactionId::default();
        rand::thread_rng().fill(&mut id.0);
        id
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64_STANDARD.encode(self.0))
    }
}

/// The 2-bit STUN message class.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum MessageClass {
    #[default]
    Request,
    Indication,
    SuccessResponse,
    ErrorResponse,
}

impl MessageClass {
    fn value(self) -> u16 {
        match self {
            MessageClass::Request => 0b00,
            MessageClass::Indication => 0b01,
            MessageClass::SuccessResponse => 0b10,
            MessageClass::ErrorResponse => 0b11,
        }
    }

    fn from_value(v: u16) -> Self {
        match v & 0b11 {
            0b00 => MessageClass::Request,
            0b01 => MessageClass::Indication,
            0b10 => MessageClass::SuccessResponse,
            _ => MessageClass::ErrorResponse,
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageClass::Request => "request",
            MessageClass::Indication => "indication",
            MessageClass::SuccessResponse => "success response",
            MessageClass::ErrorResponse => "error response",
        };
        write!(f, "{s}")
    }
}

/// The 12-bit STUN method.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Method(pub u16);

pub const METHOD_BINDING: Method = Method(0x001);

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == METHOD_BINDING {
            write!(f, "Binding")
        } else {
            write!(f, "{:#05x}", self.0)
        }
    }
}

// The 14-bit message type interleaves the method bits with the two
// class bits C1 and C0:
//
//  0                 1
//  2  3  4 5 6 7 8 9 0 1 2 3 4 5
// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
// |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
// |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
const METHOD_A_BITS: u16 = 0x000F; // M0-M3
const METHOD_B_BITS: u16 = 0x0070; // M4-M6
const METHOD_D_BITS: u16 = 0x0F80; // M7-M11

const METHOD_B_SHIFT: u16 = 1;
const METHOD_D_SHIFT: u16 = 2;

const CLASS_C0_SHIFT: u16 = 4;
const CLASS_C1_SHIFT: u16 = 7;

pub(crate) fn message_type_value(class: MessageClass, method: Method) -> u16 {
    let m = method.0;
    let a = m & METHOD_A_BITS;
    let b = m & METHOD_B_BITS;
    let d = m & METHOD_D_BITS;
    let method_bits = a + (b << METHOD_B_SHIFT) + (d << METHOD_D_SHIFT);

    let c = class.value();
    let class_bits = ((c & 0b01) << CLASS_C0_SHIFT) + ((c & 0b10) << CLASS_C1_SHIFT);

    method_bits + class_bits
}

pub(crate) fn message_type_from_value(v: u16) -> (MessageClass, Method) {
    let c0 = (v >> CLASS_C0_SHIFT) & 0b01;
    let c1 = (v >> CLASS_C1_SHIFT) & 0b10;
    let class = MessageClass::from_value(c0 + c1);

    let a = v & METHOD_A_BITS;
    let b = (v >> METHOD_B_SHIFT) & METHOD_B_BITS;
    let d = (v >> METHOD_D_SHIFT) & METHOD_D_BITS;
    let method = Method(a + b + d);

    (class, method)
}

/// A single STUN message. `raw` always holds the encoded bytes: after
/// [`Message::build`] they are freshly produced, after
/// [`Message::parse`] they are the bytes as received, which integrity
/// and fingerprint verification recompute over.
#[derive(Debug, Default, Clone)]
pub struct Message {
    pub class: MessageClass,
    pub method: Method,
    pub transaction_id: TransactionId,
    pub attributes: Vec<Attribute>,
    pub raw: Vec<u8>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} l={} attrs={} id={}",
            self.method,
            self.class,
            self.raw.len().saturating_sub(MESSAGE_HEADER_SIZE),
            self.attributes.len(),
            self.transaction_id
        )
    }
}

// raw is derived state and ignored for equality.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.method == other.method
            && self.transaction_id == other.transaction_id
            && self.attributes == other.attributes
    }
}

impl Message {
    /// Encodes a message from its parts. Attributes are applied in
    /// order: MESSAGE-INTEGRITY covers everything before it (with the
    /// header length advanced over its own TLV), FINGERPRINT covers
    /// everything before it and must come last.
    pub fn build(
        class: MessageClass,
        method: Method,
        transaction_id: TransactionId,
        attributes: Vec<Attribute>,
    ) -> Result<Message> {
        let mut m = Message {
            class,
            method,
            transaction_id,
            attributes,
            raw: Vec::with_capacity(128),
        };
        m.encode()?;
        Ok(m)
    }

    fn encode(&mut self) -> Result<()> {
        self.raw.clear();
        self.raw
            .extend_from_slice(&message_type_value(self.class, self.method).to_be_bytes());
        self.raw.extend_from_slice(&[0, 0]); // length, patched as attributes land
        self.raw.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
        self.raw.extend_from_slice(&self.transaction_id.0);

        // MESSAGE-INTEGRITY covers everything before it, so an
        // integrity attribute after FINGERPRINT cannot be computed.
        let mut seen_fingerprint = false;
        for attr in &self.attributes {
            match attr {
                Attribute::Fingerprint => seen_fingerprint = true,
                Attribute::MessageIntegrity(_) if seen_fingerprint => {
                    return Err(Error::FingerprintBeforeIntegrity);
                }
                _ => {}
            }
        }

        let attributes = std::mem::take(&mut self.attributes);
        for attr in &attributes {
            match attr {
                Attribute::MessageIntegrity(key) => {
                    // The HMAC input is the message with the header
                    // length already covering the integrity TLV.
                    self.patch_length_ahead(ATTRIBUTE_HEADER_SIZE + 20);
                    let digest = hmac_sha1(key, &self.raw);
                    self.append_tlv(attr.typ(), &digest);
                }
                Attribute::Fingerprint => {
                    // Likewise the CRC covers the length of its own TLV.
                    self.patch_length_ahead(ATTRIBUTE_HEADER_SIZE + 4);
                    let crc = fingerprint_value(&self.raw);
                    self.append_tlv(attr.typ(), &crc.to_be_bytes());
                }
                _ => {
                    let value = attr.encode_value(&self.transaction_id);
                    self.append_tlv(attr.typ(), &value);
                }
            }
        }
        self.attributes = attributes;

        Ok(())
    }

    fn append_tlv(&mut self, typ: u16, value: &[u8]) {
        self.raw.extend_from_slice(&typ.to_be_bytes());
        self.raw.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.raw.extend_from_slice(value);
        self.raw
            .resize(MESSAGE_HEADER_SIZE + nearest_padded_value_length(self.attr_bytes_len()), 0);
        self.write_length();
    }

    fn attr_bytes_len(&self) -> usize {
        self.raw.len() - MESSAGE_HEADER_SIZE
    }

    fn write_length(&mut self) {
        let length = self.attr_bytes_len() as u16;
        self.raw[2..4].copy_from_slice(&length.to_be_bytes());
    }

    // Writes a length field that pretends `extra` more bytes are
    // already appended, as integrity and fingerprint computation
    // require.
    fn patch_length_ahead(&mut self, extra: usize) {
        let length = (self.attr_bytes_len() + extra) as u16;
        self.raw[2..4].copy_from_slice(&length.to_be_bytes());
    }

    /// Decodes a message, retaining the received bytes in `raw`.
    pub fn parse(buf: &[u8]) -> Result<Message> {
        if buf.len() < MESSAGE_HEADER_SIZE {
            return Err(Error::UnexpectedHeaderEof);
        }

        let typ = u16::from_be_bytes([buf[0], buf[1]]);
        let size = u16::from_be_bytes([buf[2], buf[3]]) as usize;
        let cookie = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);

        if cookie != MAGIC_COOKIE {
            return Err(Error::InvalidMagicCookie(cookie));
        }

        let full_size = MESSAGE_HEADER_SIZE + size;
        if buf.len() < full_size {
            return Err(Error::UnexpectedEof);
        }

        let (class, method) = message_type_from_value(typ);
        let mut transaction_id = TransactionId::default();
        transaction_id
            .0
            .copy_from_slice(&buf[8..MESSAGE_HEADER_SIZE]);

        let mut attributes = vec![];
        let mut b = &buf[MESSAGE_HEADER_SIZE..full_size];
        while !b.is_empty() {
            if b.len() < ATTRIBUTE_HEADER_SIZE {
                return Err(Error::UnexpectedEof);
            }
            let attr_type = u16::from_be_bytes([b[0], b[1]]);
            let attr_len = u16::from_be_bytes([b[2], b[3]]) as usize;
            let padded_len = nearest_padded_value_length(attr_len);
            b = &b[ATTRIBUTE_HEADER_SIZE..];

            if b.len() < padded_len {
                return Err(Error::UnexpectedEof);
            }
            attributes.push(Attribute::decode(
                attr_type,
                &b[..attr_len],
                &transaction_id,
            )?);
            b = &b[padded_len..];
        }

        Ok(Message {
            class,
            method,
            transaction_id,
            attributes,
            raw: buf[..full_size].to_vec(),
        })
    }

    /// Returns true if an attribute of the given wire type is present.
    pub fn contains(&self, typ: u16) -> bool {
        self.attributes.iter().any(|a| a.typ() == typ)
    }

    pub fn xor_mapped_address(&self) -> Option<(std::net::IpAddr, u16)> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::XorMappedAddress { ip, port } => Some((*ip, *port)),
            _ => None,
        })
    }

    pub fn username(&self) -> Option<&str> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::Username(u) => Some(u.as_str()),
            _ => None,
        })
    }

    pub fn priority(&self) -> Option<u32> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::Priority(p) => Some(*p),
            _ => None,
        })
    }

    pub fn use_candidate(&self) -> bool {
        self.contains(crate::attributes::ATTR_USE_CANDIDATE)
    }

    pub fn ice_controlling(&self) -> Option<u64> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::IceControlling(t) => Some(*t),
            _ => None,
        })
    }

    pub fn ice_controlled(&self) -> Option<u64> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::IceControlled(t) => Some(*t),
            _ => None,
        })
    }
}
