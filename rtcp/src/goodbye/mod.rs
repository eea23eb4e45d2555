#[cfg(test)]
mod goodbye_test;

use std::fmt;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, COUNT_MAX, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;
use crate::util::{get_padding_size, put_padding};

const REASON_MAX: usize = 255;

/// A Goodbye (BYE) packet indicates that one or more sources are no
/// longer active.
///
///        0                   1                   2                   3
///        0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       |V=2|P|    SC   |   PT=BYE=203  |             length            |
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       |                           SSRC/CSRC                           |
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       :                              ...                              :
///       +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// (opt) |     length    |               reason for leaving            ...
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Goodbye {
    /// The SSRC/CSRC identifiers that are no longer active.
    pub sources: Vec<u32>,
    /// Optional text indicating the reason for leaving.
    pub reason: String,
}

impl fmt::Display for Goodbye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Goodbye:\n\tSources:")?;
        for source in &self.sources {
            writeln!(f, "\t{source:x}")?;
        }
        writeln!(f, "\tReason: {:?}", self.reason)
    }
}

impl RtcpPacket for Goodbye {
    fn header(&self) -> Header {
        Header {
            padding: get_padding_size(self.raw_size()) != 0,
            count: self.sources.len() as u8,
            packet_type: PacketType::Goodbye,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.sources.clone()
    }

    fn raw_size(&self) -> usize {
        let mut len = HEADER_LENGTH + self.sources.len() * SSRC_LENGTH;
        if !self.reason.is_empty() {
            len += 1 + self.reason.len();
        }
        len
    }

    fn marshal(&self) -> Result<Bytes> {
        if self.sources.len() > COUNT_MAX {
            return Err(Error::TooManySources);
        }
        if self.reason.len() > REASON_MAX {
            return Err(Error::ReasonTooLong);
        }

        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;

        for source in &self.sources {
            buf.extend_from_slice(&source.to_be_bytes());
        }

        if !self.reason.is_empty() {
            buf.extend_from_slice(&[self.reason.len() as u8]);
            buf.extend_from_slice(self.reason.as_bytes());
        }

        put_padding(&mut buf, self.raw_size());
        Ok(buf.freeze())
    }
}

impl Goodbye {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::Goodbye {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < header.count as usize * SSRC_LENGTH {
            return Err(Error::PacketTooShort);
        }

        let mut sources = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            sources.push(raw_packet.get_u32());
        }

        let mut reason = String::new();
        if raw_packet.has_remaining() {
            let length = raw_packet.get_u8() as usize;
            if length > raw_packet.remaining() {
                return Err(Error::PacketTooShort);
            }
            let text = raw_packet.copy_to_bytes(length);
            reason = String::from_utf8(text.to_vec()).map_err(|_| Error::InvalidUtf8)?;
        }

        Ok(Goodbye { sources, reason })
    }
}
