use bytes::Bytes;

use super::*;
use crate::error::Error;
use crate::packet::RtcpPacket;

#[test]
fn test_sli_roundtrip() {
    let packet = SliceLossIndication {
        sender_ssrc: 0x902f9e2e,
        media_ssrc: 0x902f9e2e,
        sli_entries: vec![
            SliEntry {
                first: 1,
                number: 0xd,
                picture: 0x3f,
            },
            SliEntry {
                first: 0x1FFF,
                number: 1,
                picture: 0,
            },
        ],
    };

    let data = packet.marshal().expect("marshal");
    assert_eq!(data.len() % 4, 0);

    let mut buf = data.clone();
    let got = SliceLossIndication::unmarshal(&mut buf).expect("unmarshal");
    assert_eq!(got, packet);
}

#[test]
fn test_sli_entry_packing() {
    // (first=3, number=4, picture=5) => 0b0000000000011_0000000000100_000101
    let packet = SliceLossIndication {
        sender_ssrc: 1,
        media_ssrc: 2,
        sli_entries: vec![SliEntry {
            first: 3,
            number: 4,
            picture: 5,
        }],
    };
    let data = packet.marshal().expect("marshal");
    let packed = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
    assert_eq!(packed, (3 << 19) | (4 << 6) | 5);
}

#[test]
fn test_sli_wrong_type() {
    let mut data = Bytes::from_static(&[
        0x81, 0xce, 0x00, 0x02, // fmt=1 is PLI
        0x90, 0x2f, 0x9e, 0x2e, 0x90, 0x2f, 0x9e, 0x2e,
    ]);
    assert_eq!(
        SliceLossIndication::unmarshal(&mut data),
        Err(Error::WrongType)
    );
}
