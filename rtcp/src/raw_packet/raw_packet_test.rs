use bytes::Bytes;

use super::*;
use crate::error::Error;
use crate::header::PacketType;
use crate::packet::RtcpPacket;

#[test]
fn test_raw_packet_roundtrip() {
    // An application-defined packet (204) we have no decoder for.
    let mut data = Bytes::from_static(&[
        0x80, 0xcc, 0x00, 0x01, // v=2, p=0, count=0, APP, len=1
        0x90, 0x2f, 0x9e, 0x2e, // app data
    ]);

    let packet = RawPacket::unmarshal(&mut data).expect("unmarshal");
    let header = packet.header();
    assert_eq!(header.packet_type, PacketType::ApplicationDefined);
    assert_eq!(header.length, 1);

    // Byte-identical round trip.
    let marshaled = packet.marshal().expect("marshal");
    assert_eq!(
        &marshaled[..],
        &[0x80, 0xcc, 0x00, 0x01, 0x90, 0x2f, 0x9e, 0x2e]
    );
}

#[test]
fn test_raw_packet_invalid_header() {
    // Version 0 in the first byte.
    let mut data = Bytes::from_static(&[0x00, 0xcc, 0x00, 0x00]);
    assert_eq!(RawPacket::unmarshal(&mut data), Err(Error::BadVersion));

    let mut data = Bytes::from_static(&[0x80]);
    assert_eq!(RawPacket::unmarshal(&mut data), Err(Error::PacketTooShort));
}
