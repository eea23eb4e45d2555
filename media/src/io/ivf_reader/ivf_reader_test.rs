use std::io::Cursor;

use super::*;
use crate::error::{Error, Result};

fn file_header_bytes() -> Vec<u8> {
    let mut header = vec![];
    header.extend_from_slice(b"DKIF"); // signature
    header.extend_from_slice(&0u16.to_le_bytes()); // version
    header.extend_from_slice(&32u16.to_le_bytes()); // header size
    header.extend_from_slice(b"VP80"); // FourCC
    header.extend_from_slice(&640u16.to_le_bytes()); // width
    header.extend_from_slice(&480u16.to_le_bytes()); // height
    header.extend_from_slice(&30u32.to_le_bytes()); // timebase denominator
    header.extend_from_slice(&1u32.to_le_bytes()); // timebase numerator
    header.extend_from_slice(&250u32.to_le_bytes()); // frame count
    header.extend_from_slice(&0u32.to_le_bytes()); // unused
    header
}

fn frame_bytes(timestamp: u64, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![];
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&timestamp.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

#[test]
fn test_ivf_reader_file_header() -> Result<()> {
    let (_, header) = IvfReader::new(Cursor::new(file_header_bytes()))?;

    assert_eq!(&header.signature, b"DKIF");
    assert_eq!(header.version, 0);
    assert_eq!(header.header_size, 32);
    assert_eq!(&header.four_cc, b"VP80");
    assert_eq!(header.width, 640);
    assert_eq!(header.height, 480);
    assert_eq!(header.timebase_denominator, 30);
    assert_eq!(header.timebase_numerator, 1);
    assert_eq!(header.num_frames, 250);
    Ok(())
}

#[test]
fn test_ivf_reader_bad_headers() {
    let mut bad_signature = file_header_bytes();
    bad_signature[..4].copy_from_slice(b"DKIX");
    assert_eq!(
        IvfReader::new(Cursor::new(bad_signature)).err(),
        Some(Error::SignatureMismatch)
    );

    let mut bad_version = file_header_bytes();
    bad_version[4..6].copy_from_slice(&3u16.to_le_bytes());
    assert_eq!(
        IvfReader::new(Cursor::new(bad_version)).err(),
        Some(Error::UnknownIvfVersion)
    );
}

#[test]
fn test_ivf_reader_parses_every_frame() -> Result<()> {
    let mut data = file_header_bytes();
    for i in 0..250u64 {
        data.extend_from_slice(&frame_bytes(i, &[i as u8; 16]));
    }

    let (mut reader, header) = IvfReader::new(Cursor::new(data))?;
    assert_eq!(header.num_frames, 250);

    for i in 0..250u64 {
        let (payload, frame_header) = reader.parse_next_frame()?;
        assert_eq!(frame_header.timestamp, i);
        assert_eq!(frame_header.frame_size, 16);
        assert_eq!(&payload[..], &[i as u8; 16]);
    }

    assert_eq!(reader.parse_next_frame().err(), Some(Error::Eof));
    Ok(())
}

#[test]
fn test_ivf_reader_truncated_frame_header() -> Result<()> {
    // 11 of the 12 frame-header bytes.
    let mut data = file_header_bytes();
    data.extend_from_slice(&[0u8; 11]);

    let (mut reader, _) = IvfReader::new(Cursor::new(data))?;
    assert_eq!(
        reader.parse_next_frame().err(),
        Some(Error::IncompleteFrameHeader)
    );
    Ok(())
}

#[test]
fn test_ivf_reader_truncated_frame_payload() -> Result<()> {
    let mut data = file_header_bytes();
    let frame = frame_bytes(0, &[7u8; 32]);
    data.extend_from_slice(&frame[..frame.len() - 8]);

    let (mut reader, _) = IvfReader::new(Cursor::new(data))?;
    assert_eq!(
        reader.parse_next_frame().err(),
        Some(Error::IncompleteFrameData)
    );
    Ok(())
}

#[test]
fn test_ivf_reader_reset_resumes() -> Result<()> {
    let mut data = file_header_bytes();
    data.extend_from_slice(&frame_bytes(0, &[1u8; 8]));
    let stream_so_far = data.clone();

    let (mut reader, _) = IvfReader::new(Cursor::new(stream_so_far))?;
    reader.parse_next_frame()?;
    assert_eq!(reader.parse_next_frame().err(), Some(Error::Eof));

    // More data "arrives"; resume from where the old stream stopped.
    data.extend_from_slice(&frame_bytes(1, &[2u8; 8]));
    reader.reset_reader(Box::new(move |bytes_read| {
        let mut cursor = Cursor::new(data.clone());
        cursor.set_position(bytes_read as u64);
        cursor
    }));

    let (payload, header) = reader.parse_next_frame()?;
    assert_eq!(header.timestamp, 1);
    assert_eq!(&payload[..], &[2u8; 8]);
    Ok(())
}
