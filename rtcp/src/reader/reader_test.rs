use std::io::Cursor;

use super::*;
use crate::error::{Error, Result};
use crate::header::PacketType;

// RR + SDES + BYE + PLI + RRR, as they would appear in a stream dump.
const STREAM_BYTES: &[u8] = &[
    // Receiver Report
    0x81, 0xc9, 0x0, 0x7, 0x90, 0x2f, 0x9e, 0x2e, 0xbc, 0x5e, 0x9a, 0x40, 0x0, 0x0, 0x0, 0x0,
    0x0, 0x0, 0x46, 0xe1, 0x0, 0x0, 0x1, 0x11, 0x9, 0xf3, 0x64, 0x32, 0x0, 0x2, 0x4a, 0x79,
    // Source Description
    0x81, 0xca, 0x0, 0xc, 0x90, 0x2f, 0x9e, 0x2e, 0x1, 0x26, 0x7b, 0x39, 0x63, 0x30, 0x30, 0x65,
    0x62, 0x39, 0x32, 0x2d, 0x31, 0x61, 0x66, 0x62, 0x2d, 0x39, 0x64, 0x34, 0x39, 0x2d, 0x61,
    0x34, 0x37, 0x64, 0x2d, 0x39, 0x31, 0x66, 0x36, 0x34, 0x65, 0x65, 0x65, 0x36, 0x39, 0x66,
    0x35, 0x7d, 0x0, 0x0, 0x0, 0x0, // Goodbye
    0x81, 0xcb, 0x0, 0x1, 0x90, 0x2f, 0x9e, 0x2e, // Picture Loss Indication
    0x81, 0xce, 0x0, 0x2, 0x90, 0x2f, 0x9e, 0x2e, 0x90, 0x2f, 0x9e, 0x2e,
    // Rapid Resynchronization Request
    0x85, 0xcd, 0x0, 0x2, 0x90, 0x2f, 0x9e, 0x2e, 0x90, 0x2f, 0x9e, 0x2e,
];

#[test]
fn test_reader_yields_all_packets() -> Result<()> {
    let mut reader = Reader::new(Cursor::new(STREAM_BYTES));

    let mut seen = vec![];
    let mut total = 0;
    while let Some((header, raw)) = reader.next_packet()? {
        assert_eq!(raw.len(), (usize::from(header.length) + 1) * 4);
        total += raw.len();
        seen.push(header.packet_type);
    }

    assert_eq!(
        seen,
        vec![
            PacketType::ReceiverReport,
            PacketType::SourceDescription,
            PacketType::Goodbye,
            PacketType::PayloadSpecificFeedback,
            PacketType::TransportSpecificFeedback,
        ]
    );
    assert_eq!(total, STREAM_BYTES.len());
    Ok(())
}

#[test]
fn test_reader_packets_parse() -> Result<()> {
    // Every yielded packet body must parse with the datagram
    // unmarshaller.
    let mut reader = Reader::new(Cursor::new(STREAM_BYTES));
    while let Some((_, raw)) = reader.next_packet()? {
        let packets = crate::packet::unmarshal(&mut &raw[..])?;
        assert_eq!(packets.len(), 1);
    }
    Ok(())
}

#[test]
fn test_reader_short_header() {
    // Two bytes of trailing garbage after a valid packet.
    let mut data = STREAM_BYTES[..8].to_vec();
    data[2] = 0;
    data[3] = 1; // RR claiming len=1 word, 4 bytes of body
    data.extend_from_slice(&[0x81, 0xc9]);

    let mut reader = Reader::new(Cursor::new(data));
    let first = reader.next_packet().expect("first packet");
    assert!(first.is_some());

    assert_eq!(reader.next_packet(), Err(Error::UnexpectedEof));
}

#[test]
fn test_reader_truncated_body() {
    // Header promises 7 words, stream holds 4 bytes.
    let data = &STREAM_BYTES[..8];
    let mut reader = Reader::new(Cursor::new(data));
    assert_eq!(reader.next_packet(), Err(Error::UnexpectedEof));
}

#[test]
fn test_reader_empty_stream() -> Result<()> {
    let mut reader = Reader::new(Cursor::new(&[] as &[u8]));
    assert_eq!(reader.next_packet()?, None);
    Ok(())
}
