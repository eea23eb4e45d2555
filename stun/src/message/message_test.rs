use std::net::{IpAddr, Ipv4Addr};

use super::*;
use crate::attributes::*;
use crate::error::{Error, Result};

#[test]
fn test_message_type_value() {
    let tests = vec![
        (
            "binding request",
            MessageClass::Request,
            METHOD_BINDING,
            0x0001u16,
        ),
        (
            "binding success",
            MessageClass::SuccessResponse,
            METHOD_BINDING,
            0x0101,
        ),
        (
            "binding error",
            MessageClass::ErrorResponse,
            METHOD_BINDING,
            0x0111,
        ),
        (
            "binding indication",
            MessageClass::Indication,
            METHOD_BINDING,
            0x0011,
        ),
        // TURN allocate, exercised for the method bit split only.
        ("allocate request", MessageClass::Request, Method(0x003), 0x0003),
    ];

    for (name, class, method, want) in tests {
        let got = message_type_value(class, method);
        assert_eq!(got, want, "{name}: got {got:#06x}, want {want:#06x}");

        let (got_class, got_method) = message_type_from_value(want);
        assert_eq!(got_class, class, "{name}: class");
        assert_eq!(got_method, method, "{name}: method");
    }
}

#[test]
fn test_message_build_header() -> Result<()> {
    let id = TransactionId::new();
    let m = Message::build(MessageClass::Request, METHOD_BINDING, id, vec![])?;

    assert_eq!(m.raw.len(), MESSAGE_HEADER_SIZE);
    assert_eq!(&m.raw[..2], &[0x00, 0x01], "type must be binding request");
    assert_eq!(&m.raw[2..4], &[0x00, 0x00], "length must be zero");
    assert_eq!(
        u32::from_be_bytes([m.raw[4], m.raw[5], m.raw[6], m.raw[7]]),
        MAGIC_COOKIE
    );
    assert_eq!(&m.raw[8..], &id.0);
    Ok(())
}

#[test]
fn test_message_roundtrip() -> Result<()> {
    let built = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        vec![
            Attribute::Username("rfrag:lfrag".to_owned()),
            Attribute::Priority(2130706431),
            Attribute::IceControlling(0x1122_3344_5566_7788),
            Attribute::UseCandidate,
            Attribute::XorMappedAddress {
                ip: IpAddr::V4(Ipv4Addr::new(203, 0, 113, 2)),
                port: 5000,
            },
            Attribute::Other {
                typ: 0x8023,
                value: vec![1, 2, 3],
            },
        ],
    )?;

    assert_eq!(built.raw.len() % 4, 0, "message must be 32-bit aligned");

    let parsed = Message::parse(&built.raw)?;
    assert_eq!(parsed, built, "parse(build(m)) != m");
    assert_eq!(parsed.raw, built.raw);

    assert_eq!(parsed.username(), Some("rfrag:lfrag"));
    assert_eq!(parsed.priority(), Some(2130706431));
    assert_eq!(parsed.ice_controlling(), Some(0x1122_3344_5566_7788));
    assert!(parsed.use_candidate());
    assert_eq!(
        parsed.xor_mapped_address(),
        Some((IpAddr::V4(Ipv4Addr::new(203, 0, 113, 2)), 5000))
    );

    Ok(())
}

#[test]
fn test_message_parse_errors() {
    let tests = vec![
        ("empty", vec![], Error::UnexpectedHeaderEof),
        ("short header", vec![0u8; 19], Error::UnexpectedHeaderEof),
        (
            "bad cookie",
            {
                let mut b = vec![0u8; 20];
                b[4..8].copy_from_slice(&0xdeadbeefu32.to_be_bytes());
                b
            },
            Error::InvalidMagicCookie(0xdeadbeef),
        ),
        (
            "length past end",
            {
                let mut b = vec![0u8; 20];
                b[2..4].copy_from_slice(&8u16.to_be_bytes());
                b[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
                b
            },
            Error::UnexpectedEof,
        ),
        (
            "attribute value truncated",
            {
                let mut b = vec![0u8; 24];
                b[2..4].copy_from_slice(&4u16.to_be_bytes());
                b[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
                // TLV claiming 8 bytes of value with none present.
                b[20..22].copy_from_slice(&ATTR_USERNAME.to_be_bytes());
                b[22..24].copy_from_slice(&8u16.to_be_bytes());
                b
            },
            Error::UnexpectedEof,
        ),
    ];

    for (name, data, want) in tests {
        let got = Message::parse(&data);
        assert_eq!(got, Err(want), "{name}");
    }
}

#[test]
fn test_is_message() -> Result<()> {
    let m = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        TransactionId::new(),
        vec![],
    )?;
    assert!(is_message(&m.raw));

    assert!(!is_message(&[]), "empty slice is not a message");
    assert!(!is_message(&vec![0u8; 20]), "zero cookie is not a message");

    // DTLS and RTP first bytes must not look like STUN.
    let mut raw = m.raw.clone();
    raw[0] = 22;
    assert!(!is_message(&raw));
    raw[0] = 128;
    assert!(!is_message(&raw));
    Ok(())
}

#[test]
fn test_message_unknown_attribute_preserved() -> Result<()> {
    let m = Message::build(
        MessageClass::Indication,
        METHOD_BINDING,
        TransactionId::new(),
        vec![Attribute::Other {
            typ: 0x4000,
            value: vec![0xde, 0xad],
        }],
    )?;

    let parsed = Message::parse(&m.raw)?;
    assert_eq!(
        parsed.attributes,
        vec![Attribute::Other {
            typ: 0x4000,
            value: vec![0xde, 0xad],
        }]
    );
    Ok(())
}
