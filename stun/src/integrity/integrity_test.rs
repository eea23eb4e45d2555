use std::net::{IpAddr, Ipv4Addr};

use super::*;
use crate::attributes::Attribute;
use crate::error::{Error, Result};
use crate::message::{Message, MessageClass, TransactionId, METHOD_BINDING};

fn sample_message(key: &[u8], with_fingerprint: bool) -> Message {
    let mut attrs = vec![
        Attribute::Username("user:frag".to_owned()),
        Attribute::XorMappedAddress {
            ip: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)),
            port: 3478,
        },
        Attribute::MessageIntegrity(key.to_vec()),
    ];
    if with_fingerprint {
        attrs.push(Attribute::Fingerprint);
    }

    Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        attrs,
    )
    .expect("build")
}

#[test]
fn test_integrity_roundtrip() -> Result<()> {
    let key = b"the short term password";

    let m = sample_message(key, false);
    let parsed = Message::parse(&m.raw)?;
    parsed.verify_integrity(key)?;

    // Integrity is keyed: a different password must fail.
    assert_eq!(
        parsed.verify_integrity(b"not the password"),
        Err(Error::IntegrityCheckFailure)
    );
    Ok(())
}

#[test]
fn test_integrity_excludes_fingerprint() -> Result<()> {
    // The HMAC must cover the message only up to the integrity
    // attribute, so adding FINGERPRINT afterwards cannot break it.
    let key = b"pwd";
    let parsed = Message::parse(&sample_message(key, true).raw)?;
    parsed.verify_integrity(key)?;
    parsed.verify_fingerprint()?;
    Ok(())
}

#[test]
fn test_integrity_detects_tampering() -> Result<()> {
    let key = b"pwd";
    let m = sample_message(key, false);

    // Flip one bit inside the USERNAME value.
    let mut raw = m.raw.clone();
    raw[25] ^= 0x40;
    let parsed = Message::parse(&raw)?;
    assert_eq!(
        parsed.verify_integrity(key),
        Err(Error::IntegrityCheckFailure)
    );
    Ok(())
}

#[test]
fn test_integrity_missing() -> Result<()> {
    let m = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        vec![],
    )?;
    assert_eq!(m.verify_integrity(b"pwd"), Err(Error::AttributeNotFound));
    Ok(())
}

#[test]
fn test_fingerprint_must_follow_integrity() {
    let result = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        vec![
            Attribute::Fingerprint,
            Attribute::MessageIntegrity(b"pwd".to_vec()),
        ],
    );
    assert_eq!(result, Err(Error::FingerprintBeforeIntegrity));
}
