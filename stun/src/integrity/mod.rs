#[cfg(test)]
mod integrity_test;

use ring::hmac;
use subtle::ConstantTimeEq;

use crate::attributes::{Attribute, MESSAGE_INTEGRITY_SIZE};
use crate::error::{Error, Result};
use crate::message::{Message, ATTRIBUTE_HEADER_SIZE, MESSAGE_HEADER_SIZE};

pub(crate) fn hmac_sha1(key: &[u8], message: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    hmac::sign(&key, message).as_ref().to_vec()
}

impl Message {
    /// Checks the MESSAGE-INTEGRITY attribute against `key` (the
    /// short-term credential password). The HMAC input is the message
    /// up to the integrity attribute with the header length field set
    /// as it was on the sender: covering the integrity TLV, not the
    /// attributes after it.
    pub fn verify_integrity(&self, key: &[u8]) -> Result<()> {
        let (offset, received) = self
            .attribute_offset(|a| matches!(a, Attribute::MessageIntegrity(_)))
            .ok_or(Error::AttributeNotFound)?;

        let Attribute::MessageIntegrity(digest) = received else {
            return Err(Error::AttributeNotFound);
        };

        let mut input = self.raw[..offset].to_vec();
        let patched_len =
            (offset - MESSAGE_HEADER_SIZE + ATTRIBUTE_HEADER_SIZE + MESSAGE_INTEGRITY_SIZE) as u16;
        input[2..4].copy_from_slice(&patched_len.to_be_bytes());

        let expected = hmac_sha1(key, &input);
        if expected.ct_eq(digest.as_slice()).into() {
            Ok(())
        } else {
            Err(Error::IntegrityCheckFailure)
        }
    }

    /// Byte offset of the first attribute matching `pred`, walking the
    /// attribute list in encode order.
    pub(crate) fn attribute_offset(
        &self,
        pred: impl Fn(&Attribute) -> bool,
    ) -> Option<(usize, &Attribute)> {
        let mut offset = MESSAGE_HEADER_SIZE;
        for a in &self.attributes {
            if pred(a) {
                return Some((offset, a));
            }
            offset += ATTRIBUTE_HEADER_SIZE + crate::attributes::nearest_padded_value_length(
                match a {
                    Attribute::MessageIntegrity(_) => MESSAGE_INTEGRITY_SIZE,
                    Attribute::Fingerprint => crate::attributes::FINGERPRINT_SIZE,
                    _ => a.encode_value(&self.transaction_id).len(),
                },
            );
        }
        None
    }
}
