
use std::fmt;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, COUNT_MAX, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;
use crate::util::get_padding_size;

const SDES_TEXT_MAX: usize = 255;

/// The item types carried inside an SDES chunk.
///
/// RFC 3550, 6.5
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum SdesType {
    #[default]
    End = 0, // end of item list
    Cname = 1,    // canonical name
    Name = 2,     // user name
    Email = 3,    // electronic mail address
    Phone = 4,    // phone number
    Location = 5, // geographic user location
    Tool = 6,     // name of application or tool
    Note = 7,     // notice about the source
    Private = 8,  // private extensions
}

impl From<u8> for SdesType {
    fn from(b: u8) -> Self {
        match b {
            1 => SdesType::Cname,
            2 => SdesType::Name,
            3 => SdesType::Email,
            4 => SdesType::Phone,
            5 => SdesType::Location,
            6 => SdesType::Tool,
            7 => SdesType::Note,
            8 => SdesType::Private,
            _ => SdesType::End,
        }
    }
}

impl fmt::Display for SdesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SdesType::End => "END",
            SdesType::Cname => "CNAME",
            SdesType::Name => "NAME",
            SdesType::Email => "EMAIL",
            SdesType::Phone => "PHONE",
            SdesType::Location => "LOC",
            SdesType::Tool => "TOOL",
            SdesType::Note => "NOTE",
            SdesType::Private => "PRIV",
        };
        write!(f, "{s}")
    }
}

/// One item of a chunk: a type octet, a length octet, and UTF-8 text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceDescriptionItem {
    pub sdes_type: SdesType,
    pub text: String,
}

impl SourceDescriptionItem {
    fn raw_size(&self) -> usize {
        2 + self.text.len()
    }
}

/// One chunk: an SSRC followed by items, a type-0 end marker, and null
/// padding to the next 32-bit boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceDescriptionChunk {
    pub source: u32,
    pub items: Vec<SourceDescriptionItem>,
}

impl SourceDescriptionChunk {
    fn raw_size(&self) -> usize {
        let items: usize = self.items.iter().map(SourceDescriptionItem::raw_size).sum();
        SSRC_LENGTH + items + 1 // trailing END octet
    }

    // Chunks are individually padded to 32-bit boundaries.
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        l + get_padding_size(l)
    }

    fn marshal_to(&self, buf: &mut BytesMut) -> Result<()> {
        buf.extend_from_slice(&self.source.to_be_bytes());

        for item in &self.items {
            if item.text.len() > SDES_TEXT_MAX {
                return Err(Error::SdesTextTooLong);
            }
            buf.extend_from_slice(&[item.sdes_type as u8, item.text.len() as u8]);
            buf.extend_from_slice(item.text.as_bytes());
        }

        buf.extend_from_slice(&[SdesType::End as u8]);
        buf.resize(buf.len() + get_padding_size(self.raw_size()), 0);
        Ok(())
    }
}

/// A SourceDescription (SDES) packet binds SSRCs to metadata, most
/// importantly the CNAME.
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|    SC   |  PT=SDES=202  |             length            |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                          SSRC/CSRC_1                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           SDES items                          |
/// |                              ...                              |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceDescription {
    pub chunks: Vec<SourceDescriptionChunk>,
}

impl RtcpPacket for SourceDescription {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: self.chunks.len() as u8,
            packet_type: PacketType::SourceDescription,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.chunks.iter().map(|c| c.source).collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + self
                .chunks
                .iter()
                .map(SourceDescriptionChunk::marshal_size)
                .sum::<usize>()
    }

    fn marshal(&self) -> Result<Bytes> {
        if self.chunks.len() > COUNT_MAX {
            return Err(Error::TooManyChunks);
        }

        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;
        for chunk in &self.chunks {
            chunk.marshal_to(&mut buf)?;
        }
        Ok(buf.freeze())
    }
}

impl SourceDescription {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::SourceDescription {
            return Err(Error::WrongType);
        }

        let body = raw_packet.copy_to_bytes(raw_packet.remaining());
        let mut offset = 0;

        let mut chunks = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            let (chunk, next) = Self::unmarshal_chunk(&body, offset)?;
            chunks.push(chunk);
            offset = next;
        }

        Ok(SourceDescription { chunks })
    }

    fn unmarshal_chunk(body: &Bytes, mut i: usize) -> Result<(SourceDescriptionChunk, usize)> {
        if i + SSRC_LENGTH > body.len() {
            return Err(Error::PacketTooShort);
        }
        let source = u32::from_be_bytes([body[i], body[i + 1], body[i + 2], body[i + 3]]);
        i += SSRC_LENGTH;

        let mut items = vec![];
        loop {
            if i >= body.len() {
                // the item list must be closed by an END octet
                return Err(Error::PacketTooShort);
            }

            let sdes_type = SdesType::from(body[i]);
            i += 1;
            if sdes_type == SdesType::End {
                // chunks are null padded to 32-bit boundaries
                i += get_padding_size(i);
                if i > body.len() {
                    return Err(Error::PacketTooShort);
                }
                return Ok((SourceDescriptionChunk { source, items }, i));
            }

            if i >= body.len() {
                return Err(Error::SdesMissingType);
            }
            let length = body[i] as usize;
            i += 1;

            if i + length > body.len() {
                return Err(Error::PacketTooShort);
            }
            let text = String::from_utf8(body[i..i + length].to_vec())
                .map_err(|_| Error::InvalidUtf8)?;
            i += length;

            items.push(SourceDescriptionItem { sdes_type, text });
        }
    }
}
