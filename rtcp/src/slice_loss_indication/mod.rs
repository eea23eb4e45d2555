#[cfg(test)]
mod slice_loss_indication_test;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, FORMAT_SLI, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;

const SLI_ENTRY_LENGTH: usize = 4;

/// One lost-slice report: (first, number, picture) packed into 32
/// bits as 13 + 13 + 6.
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |            First        |        Number           | PictureID |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SliEntry {
    /// Macroblock address of the first lost macroblock.
    pub first: u16,
    /// Number of lost macroblocks.
    pub number: u16,
    /// The picture the loss belongs to, modulo 64.
    pub picture: u8,
}

/// A SliceLossIndication (SLI) packet reports the loss of one or more
/// consecutive macroblocks.
///
/// RFC 4585, 6.3.2
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SliceLossIndication {
    /// The SSRC of the sender of this packet.
    pub sender_ssrc: u32,
    /// The SSRC of the media source the losses pertain to.
    pub media_ssrc: u32,
    pub sli_entries: Vec<SliEntry>,
}

impl RtcpPacket for SliceLossIndication {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_SLI,
            packet_type: PacketType::PayloadSpecificFeedback,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + 2 * SSRC_LENGTH + self.sli_entries.len() * SLI_ENTRY_LENGTH
    }

    fn marshal(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;
        buf.extend_from_slice(&self.sender_ssrc.to_be_bytes());
        buf.extend_from_slice(&self.media_ssrc.to_be_bytes());

        for entry in &self.sli_entries {
            let packed = (u32::from(entry.first & 0x1FFF) << 19)
                | (u32::from(entry.number & 0x1FFF) << 6)
                | u32::from(entry.picture & 0x3F);
            buf.extend_from_slice(&packed.to_be_bytes());
        }

        Ok(buf.freeze())
    }
}

impl SliceLossIndication {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::PayloadSpecificFeedback || header.count != FORMAT_SLI
        {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < 2 * SSRC_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let sender_ssrc = raw_packet.get_u32();
        let media_ssrc = raw_packet.get_u32();

        let mut sli_entries = vec![];
        while raw_packet.remaining() >= SLI_ENTRY_LENGTH {
            let packed = raw_packet.get_u32();
            sli_entries.push(SliEntry {
                first: ((packed >> 19) & 0x1FFF) as u16,
                number: ((packed >> 6) & 0x1FFF) as u16,
                picture: (packed & 0x3F) as u8,
            });
        }
        if raw_packet.has_remaining() {
            return Err(Error::PacketTooShort);
        }

        Ok(SliceLossIndication {
            sender_ssrc,
            media_ssrc,
            sli_entries,
        })
    }
}
