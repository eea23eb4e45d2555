use bytes::{Bytes, BytesMut};

use super::*;
use crate::error::Error;

#[test]
fn test_reception_report_unmarshal() {
    let mut data = Bytes::from_static(&[
        0xaa, 0xbb, 0xcc, 0xdd, // ssrc=0xaabbccdd
        0x00, 0x00, 0x00, 0x00, // fracLost=0, totalLost=0
        0x00, 0x00, 0x46, 0xe1, // lastSeq=0x46e1
        0x00, 0x00, 0x01, 0x11, // jitter=273
        0x09, 0xf3, 0x64, 0x32, // lsr=0x9f36432
        0x00, 0x02, 0x4a, 0x79, // delay=150137
    ]);

    let got = ReceptionReport::unmarshal(&mut data).expect("unmarshal");
    let want = ReceptionReport {
        ssrc: 0xaabbccdd,
        fraction_lost: 0,
        total_lost: 0,
        last_sequence_number: 0x46e1,
        jitter: 273,
        last_sender_report: 0x9f36432,
        delay: 150137,
    };
    assert_eq!(got, want);
}

#[test]
fn test_reception_report_roundtrip() {
    let report = ReceptionReport {
        ssrc: 1,
        fraction_lost: 2,
        total_lost: 3,
        last_sequence_number: 4,
        jitter: 5,
        last_sender_report: 6,
        delay: 7,
    };

    let mut buf = BytesMut::new();
    report.marshal_to(&mut buf).expect("marshal");
    assert_eq!(buf.len(), RECEPTION_REPORT_LENGTH);

    let mut data = buf.freeze();
    let got = ReceptionReport::unmarshal(&mut data).expect("unmarshal");
    assert_eq!(got, report);
}

#[test]
fn test_reception_report_total_lost_cap() {
    // The largest value that fits a signed 24-bit field.
    let mut report = ReceptionReport {
        total_lost: (1 << 23) - 1,
        ..ReceptionReport::default()
    };
    let mut buf = BytesMut::new();
    assert!(report.marshal_to(&mut buf).is_ok());

    report.total_lost = 1 << 23;
    let mut buf = BytesMut::new();
    assert_eq!(report.marshal_to(&mut buf), Err(Error::InvalidTotalLost));
}

#[test]
fn test_reception_report_too_short() {
    let mut data = Bytes::from_static(&[0x00; 10]);
    assert_eq!(
        ReceptionReport::unmarshal(&mut data),
        Err(Error::PacketTooShort)
    );
}
