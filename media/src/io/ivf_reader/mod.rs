#[cfg(test)]
mod ivf_reader_test;

use std::io::{ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::BytesMut;

use crate::error::{Error, Result};
use crate::io::ResetFn;

pub const IVF_FILE_HEADER_SIGNATURE: &[u8] = b"DKIF";
pub const IVF_FILE_HEADER_SIZE: usize = 32;
pub const IVF_FRAME_HEADER_SIZE: usize = 12;

/// The 32-byte header at the start of an IVF file.
/// <https://wiki.multimedia.cx/index.php/IVF>
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IvfFileHeader {
    pub signature: [u8; 4],        // 0-3
    pub version: u16,              // 4-5
    pub header_size: u16,          // 6-7
    pub four_cc: [u8; 4],          // 8-11, e.g. "VP80"
    pub width: u16,                // 12-13
    pub height: u16,               // 14-15
    pub timebase_denominator: u32, // 16-19
    pub timebase_numerator: u32,   // 20-23
    pub num_frames: u32,           // 24-27
    pub unused: u32,               // 28-31
}

/// The 12-byte header preceding every frame payload.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IvfFrameHeader {
    pub frame_size: u32, // 0-3
    pub timestamp: u64,  // 4-11
}

/// IvfReader parses an IVF byte stream and yields frame payloads, one
/// at a time.
pub struct IvfReader<R: Read> {
    reader: R,
    bytes_read: usize,
}

impl<R: Read> IvfReader<R> {
    /// Consumes the file header and returns the reader together with
    /// it.
    pub fn new(reader: R) -> Result<(IvfReader<R>, IvfFileHeader)> {
        let mut r = IvfReader {
            reader,
            bytes_read: 0,
        };

        let header = r.parse_file_header()?;

        Ok((r, header))
    }

    /// Swaps the underlying stream for a fresh one positioned past the
    /// bytes already consumed. Useful for live streams where EOF only
    /// means "no more data yet".
    pub fn reset_reader(&mut self, mut reset: ResetFn<R>) {
        self.reader = reset(self.bytes_read);
    }

    /// Reads the next frame header and payload. A clean EOF on the
    /// frame-header boundary reports `Error::Eof`; anything shorter
    /// than announced reports the matching incomplete error.
    pub fn parse_next_frame(&mut self) -> Result<(BytesMut, IvfFrameHeader)> {
        let mut frame_header = [0u8; IVF_FRAME_HEADER_SIZE];
        read_exact_or(&mut self.reader, &mut frame_header, Error::IncompleteFrameHeader)?;

        let header = IvfFrameHeader {
            frame_size: u32::from_le_bytes([
                frame_header[0],
                frame_header[1],
                frame_header[2],
                frame_header[3],
            ]),
            timestamp: u64::from_le_bytes([
                frame_header[4],
                frame_header[5],
                frame_header[6],
                frame_header[7],
                frame_header[8],
                frame_header[9],
                frame_header[10],
                frame_header[11],
            ]),
        };

        let mut payload = BytesMut::zeroed(header.frame_size as usize);
        self.reader.read_exact(&mut payload).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                Error::IncompleteFrameData
            } else {
                Error::from(err)
            }
        })?;

        self.bytes_read += IVF_FRAME_HEADER_SIZE + header.frame_size as usize;

        Ok((payload, header))
    }

    // Always called once, before the first parse_next_frame().
    fn parse_file_header(&mut self) -> Result<IvfFileHeader> {
        let mut signature = [0u8; 4];
        let mut four_cc = [0u8; 4];

        self.reader.read_exact(&mut signature)?;
        let version = self.reader.read_u16::<LittleEndian>()?;
        let header_size = self.reader.read_u16::<LittleEndian>()?;
        self.reader.read_exact(&mut four_cc)?;

        let header = IvfFileHeader {
            signature,
            version,
            header_size,
            four_cc,
            width: self.reader.read_u16::<LittleEndian>()?,
            height: self.reader.read_u16::<LittleEndian>()?,
            timebase_denominator: self.reader.read_u32::<LittleEndian>()?,
            timebase_numerator: self.reader.read_u32::<LittleEndian>()?,
            num_frames: self.reader.read_u32::<LittleEndian>()?,
            unused: self.reader.read_u32::<LittleEndian>()?,
        };

        if header.signature != IVF_FILE_HEADER_SIGNATURE {
            return Err(Error::SignatureMismatch);
        }
        if header.version != 0 {
            return Err(Error::UnknownIvfVersion);
        }

        self.bytes_read += IVF_FILE_HEADER_SIZE;

        Ok(header)
    }
}

// Distinguishes a clean EOF on a record boundary from a torn record.
fn read_exact_or(reader: &mut impl Read, buf: &mut [u8], torn: Error) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(if filled == 0 { Error::Eof } else { torn });
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
