#[cfg(test)]
mod fingerprint_test;

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::attributes::Attribute;
use crate::error::{Error, Result};
use crate::message::Message;

pub const FINGERPRINT_XOR_VALUE: u32 = 0x5354554e;

/// CRC-32 of `b` XOR'd with 0x5354554e. The XOR keeps the value
/// distinct when an application protocol on the same port also ends
/// packets with a CRC-32.
pub fn fingerprint_value(b: &[u8]) -> u32 {
    Crc::<u32>::new(&CRC_32_ISO_HDLC).checksum(b) ^ FINGERPRINT_XOR_VALUE
}

impl Message {
    /// Checks the FINGERPRINT attribute: the CRC of everything before
    /// its TLV must match the transmitted value.
    pub fn verify_fingerprint(&self) -> Result<()> {
        let (offset, _) = self
            .attribute_offset(|a| matches!(a, Attribute::Fingerprint))
            .ok_or(Error::AttributeNotFound)?;

        let value_start = offset + 4;
        if self.raw.len() < value_start + 4 {
            return Err(Error::UnexpectedEof);
        }

        let received = u32::from_be_bytes([
            self.raw[value_start],
            self.raw[value_start + 1],
            self.raw[value_start + 2],
            self.raw[value_start + 3],
        ]);

        if fingerprint_value(&self.raw[..offset]) == received {
            Ok(())
        } else {
            Err(Error::FingerprintMismatch)
        }
    }
}
