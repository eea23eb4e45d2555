use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::*;
use crate::error::{Error, Result};
use crate::message::TransactionId;

#[test]
fn test_padding() {
    let tests = vec![(0usize, 0usize), (1, 4), (2, 4), (3, 4), (4, 4), (5, 8), (8, 8)];
    for (input, want) in tests {
        assert_eq!(nearest_padded_value_length(input), want, "pad({input})");
    }
}

#[test]
fn test_xor_address_roundtrip() -> Result<()> {
    let id = TransactionId::new();

    let tests: Vec<(IpAddr, u16)> = vec![
        (IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 1234),
        (IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 65535),
        (IpAddr::V6(Ipv6Addr::LOCALHOST), 123),
        (
            IpAddr::V6("2001:db8::68".parse::<Ipv6Addr>().unwrap()),
            21254,
        ),
    ];

    for (ip, port) in tests {
        let attr = Attribute::XorMappedAddress { ip, port };
        let value = attr.encode_value(&id);
        let decoded = Attribute::decode(ATTR_XOR_MAPPED_ADDRESS, &value, &id)?;
        assert_eq!(decoded, attr, "{ip}:{port}");
    }

    Ok(())
}

#[test]
fn test_xor_address_value_is_masked() {
    // The encoded bytes must not contain the plain port or address:
    // that is the entire point of the XOR.
    let id = TransactionId::new();
    let attr = Attribute::XorMappedAddress {
        ip: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
        port: 0x1234,
    };
    let value = attr.encode_value(&id);
    assert_eq!(u16::from_be_bytes([value[0], value[1]]), 0x01, "family");
    assert_ne!(u16::from_be_bytes([value[2], value[3]]), 0x1234);
    assert_ne!(&value[4..8], &[192, 0, 2, 1]);
}

#[test]
fn test_decode_errors() {
    let id = TransactionId::default();
    let tests = vec![
        (
            "xor addr empty",
            ATTR_XOR_MAPPED_ADDRESS,
            vec![],
            Error::UnexpectedEof,
        ),
        (
            "xor addr bad family",
            ATTR_XOR_MAPPED_ADDRESS,
            vec![0, 3, 0, 0, 1, 2, 3, 4],
            Error::InvalidAddressFamily,
        ),
        (
            "xor addr short v6",
            ATTR_XOR_MAPPED_ADDRESS,
            vec![0, 2, 0, 0, 1, 2, 3, 4],
            Error::AttributeSizeInvalid,
        ),
        (
            "priority short",
            ATTR_PRIORITY,
            vec![0, 1],
            Error::AttributeSizeInvalid,
        ),
        (
            "controlling short",
            ATTR_ICE_CONTROLLING,
            vec![0; 4],
            Error::AttributeSizeInvalid,
        ),
        (
            "integrity wrong size",
            ATTR_MESSAGE_INTEGRITY,
            vec![0; 16],
            Error::AttributeSizeInvalid,
        ),
        (
            "fingerprint wrong size",
            ATTR_FINGERPRINT,
            vec![0; 2],
            Error::AttributeSizeInvalid,
        ),
    ];

    for (name, typ, value, want) in tests {
        let got = Attribute::decode(typ, &value, &id);
        assert_eq!(got, Err(want), "{name}");
    }
}

#[test]
fn test_attr_type_mapping() {
    let tests = vec![
        (Attribute::Username(String::new()), ATTR_USERNAME),
        (Attribute::Priority(0), ATTR_PRIORITY),
        (Attribute::UseCandidate, ATTR_USE_CANDIDATE),
        (Attribute::IceControlling(0), ATTR_ICE_CONTROLLING),
        (Attribute::IceControlled(0), ATTR_ICE_CONTROLLED),
        (Attribute::MessageIntegrity(vec![]), ATTR_MESSAGE_INTEGRITY),
        (Attribute::Fingerprint, ATTR_FINGERPRINT),
        (
            Attribute::Other {
                typ: 0x7777,
                value: vec![],
            },
            0x7777,
        ),
    ];

    for (attr, want) in tests {
        assert_eq!(attr.typ(), want, "{attr}");
    }
}
