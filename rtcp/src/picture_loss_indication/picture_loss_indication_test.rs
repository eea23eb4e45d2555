use bytes::Bytes;

use super::*;
use crate::error::Error;
use crate::packet::RtcpPacket;

const PLI_BYTES: [u8; 12] = [
    0x81, 0xce, 0x00, 0x02, // v=2, p=0, fmt=1, PSFB, len=2
    0x00, 0x00, 0x00, 0x00, // sender=0x0
    0x4b, 0xc4, 0xfc, 0xb4, // media=0x4bc4fcb4
];

#[test]
fn test_pli_unmarshal() {
    let mut data = Bytes::from_static(&PLI_BYTES);
    let got = PictureLossIndication::unmarshal(&mut data).expect("unmarshal");
    assert_eq!(
        got,
        PictureLossIndication {
            sender_ssrc: 0x0,
            media_ssrc: 0x4bc4fcb4,
        }
    );
    assert_eq!(got.destination_ssrc(), vec![0x4bc4fcb4]);
}

#[test]
fn test_pli_marshal() {
    let packet = PictureLossIndication {
        sender_ssrc: 0x0,
        media_ssrc: 0x4bc4fcb4,
    };
    let data = packet.marshal().expect("marshal");
    assert_eq!(&data[..], &PLI_BYTES[..]);
}

#[test]
fn test_pli_wrong_format() {
    // fmt=2 is SLI, not PLI.
    let mut data = Bytes::from_static(&[
        0x82, 0xce, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x4b, 0xc4, 0xfc, 0xb4,
    ]);
    assert_eq!(
        PictureLossIndication::unmarshal(&mut data),
        Err(Error::WrongType)
    );
}

#[test]
fn test_pli_too_short() {
    let mut data = Bytes::from_static(&[0x81, 0xce, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(
        PictureLossIndication::unmarshal(&mut data),
        Err(Error::PacketTooShort)
    );
}
