#[cfg(test)]
mod reader_test;

use std::io::{self, Read};

use crate::error::{Error, Result};
use crate::header::{Header, HEADER_LENGTH};

/// Reader consumes a byte stream of concatenated RTCP packets and
/// yields one `(header, raw bytes)` pair at a time: a lazy, finite,
/// non-restartable sequence. The raw bytes include the 4-byte header.
pub struct Reader<R: Read> {
    reader: R,
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader { reader }
    }

    /// Returns the next packet, `Ok(None)` once the stream is cleanly
    /// exhausted, or `Error::UnexpectedEof` when the stream ends in
    /// the middle of a packet.
    pub fn next_packet(&mut self) -> Result<Option<(Header, Vec<u8>)>> {
        let mut packet = vec![0u8; HEADER_LENGTH];

        // A clean EOF is only acceptable on a packet boundary.
        match self.reader.read(&mut packet) {
            Ok(0) => return Ok(None),
            Ok(n) => self
                .reader
                .read_exact(&mut packet[n..])
                .map_err(map_eof)?,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                self.reader.read_exact(&mut packet).map_err(map_eof)?;
            }
            Err(err) => return Err(err.into()),
        }

        let header = Header::unmarshal(&mut &packet[..])?;

        let body_length = header.length as usize * 4;
        packet.resize(HEADER_LENGTH + body_length, 0);
        self.reader
            .read_exact(&mut packet[HEADER_LENGTH..])
            .map_err(map_eof)?;

        Ok(Some((header, packet)))
    }
}

fn map_eof(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::UnexpectedEof
    } else {
        err.into()
    }
}
