use bytes::Bytes;

use super::*;
use crate::error::Error;
use crate::packet::RtcpPacket;

const RRR_BYTES: [u8; 12] = [
    0x85, 0xcd, 0x00, 0x02, // v=2, p=0, fmt=5, TSFB, len=2
    0x90, 0x2f, 0x9e, 0x2e, // sender=0x902f9e2e
    0x90, 0x2f, 0x9e, 0x2e, // media=0x902f9e2e
];

#[test]
fn test_rrr_roundtrip() {
    let packet = RapidResynchronizationRequest {
        sender_ssrc: 0x902f9e2e,
        media_ssrc: 0x902f9e2e,
    };

    let data = packet.marshal().expect("marshal");
    assert_eq!(&data[..], &RRR_BYTES[..]);

    let mut buf = data.clone();
    let got = RapidResynchronizationRequest::unmarshal(&mut buf).expect("unmarshal");
    assert_eq!(got, packet);
    assert_eq!(got.destination_ssrc(), vec![0x902f9e2e]);
}

#[test]
fn test_rrr_wrong_format() {
    // fmt=1 under TSFB is a transport-layer NACK.
    let mut data = Bytes::from_static(&[
        0x81, 0xcd, 0x00, 0x02, 0x90, 0x2f, 0x9e, 0x2e, 0x90, 0x2f, 0x9e, 0x2e,
    ]);
    assert_eq!(
        RapidResynchronizationRequest::unmarshal(&mut data),
        Err(Error::WrongType)
    );
}
