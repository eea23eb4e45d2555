use super::*;
use crate::attributes::Attribute;
use crate::error::{Error, Result};
use crate::message::{Message, MessageClass, TransactionId, METHOD_BINDING};

#[test]
fn test_fingerprint_value_uses_xor() {
    // CRC-32 of an empty input is 0, so the attribute value collapses
    // to the XOR constant.
    assert_eq!(fingerprint_value(&[]), FINGERPRINT_XOR_VALUE);
}

#[test]
fn test_fingerprint_roundtrip() -> Result<()> {
    let m = Message::build(
        MessageClass::SuccessResponse,
        METHOD_BINDING,
        TransactionId::new(),
        vec![
            Attribute::Username("a:b".to_owned()),
            Attribute::Fingerprint,
        ],
    )?;

    let parsed = Message::parse(&m.raw)?;
    parsed.verify_fingerprint()?;
    Ok(())
}

#[test]
fn test_fingerprint_detects_corruption() -> Result<()> {
    let m = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        vec![Attribute::Fingerprint],
    )?;

    let mut raw = m.raw.clone();
    let port_byte = raw.len() - 1;
    raw[port_byte] ^= 0xFF;
    let parsed = Message::parse(&raw)?;
    assert_eq!(parsed.verify_fingerprint(), Err(Error::FingerprintMismatch));
    Ok(())
}

#[test]
fn test_fingerprint_missing() -> Result<()> {
    let m = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        vec![],
    )?;
    assert_eq!(m.verify_fingerprint(), Err(Error::AttributeNotFound));
    Ok(())
}
