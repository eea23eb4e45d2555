use bytes::Bytes;

use super::*;
use crate::error::Error;
use crate::packet::RtcpPacket;

#[test]
fn test_goodbye_unmarshal() {
    // v=2, p=0, count=1, BYE, len=1
    let mut data = Bytes::from_static(&[0x81, 0xcb, 0x00, 0x01, 0x90, 0x2f, 0x9e, 0x2e]);
    let got = Goodbye::unmarshal(&mut data).expect("unmarshal");
    assert_eq!(
        got,
        Goodbye {
            sources: vec![0x902f9e2e],
            reason: String::new(),
        }
    );
    assert_eq!(got.destination_ssrc(), vec![0x902f9e2e]);
}

#[test]
fn test_goodbye_roundtrip_with_reason() {
    let packet = Goodbye {
        sources: vec![0x01020304, 0x05060708],
        reason: "camera malfunction".to_owned(),
    };

    let data = packet.marshal().expect("marshal");
    assert_eq!(data.len() % 4, 0);

    let header = packet.header();
    assert_eq!(header.count, 2);
    assert_eq!(usize::from(header.length), data.len() / 4 - 1);

    let mut buf = data.clone();
    let got = Goodbye::unmarshal(&mut buf).expect("unmarshal");
    assert_eq!(got, packet);
}

#[test]
fn test_goodbye_reason_too_long() {
    let packet = Goodbye {
        sources: vec![1],
        reason: "x".repeat(256),
    };
    assert_eq!(packet.marshal(), Err(Error::ReasonTooLong));
}

#[test]
fn test_goodbye_too_many_sources() {
    let packet = Goodbye {
        sources: vec![0; 32],
        reason: String::new(),
    };
    assert_eq!(packet.marshal(), Err(Error::TooManySources));
}

#[test]
fn test_goodbye_reason_truncated() {
    // Reason length byte claims 4 octets, only 2 present.
    let mut data = Bytes::from_static(&[
        0x81, 0xcb, 0x00, 0x02, // header
        0x90, 0x2f, 0x9e, 0x2e, // source
        0x04, 0x41, 0x42, 0x00, // len=4, "AB"
    ]);
    assert_eq!(Goodbye::unmarshal(&mut data), Err(Error::PacketTooShort));
}
