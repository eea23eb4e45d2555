#[cfg(test)]
mod picture_loss_indication_test;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, FORMAT_PLI, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;

const PLI_LENGTH: usize = 2 * SSRC_LENGTH;

/// A PictureLossIndication (PLI) packet informs the encoder about the
/// loss of an undefined amount of coded video data.
///
/// RFC 4585, 6.3.1
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PictureLossIndication {
    /// The SSRC of the sender of this packet.
    pub sender_ssrc: u32,
    /// The SSRC of the media source the loss pertains to.
    pub media_ssrc: u32,
}

impl RtcpPacket for PictureLossIndication {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_PLI,
            packet_type: PacketType::PayloadSpecificFeedback,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + PLI_LENGTH
    }

    fn marshal(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;
        buf.extend_from_slice(&self.sender_ssrc.to_be_bytes());
        buf.extend_from_slice(&self.media_ssrc.to_be_bytes());
        Ok(buf.freeze())
    }
}

impl PictureLossIndication {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::PayloadSpecificFeedback || header.count != FORMAT_PLI
        {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < PLI_LENGTH {
            return Err(Error::PacketTooShort);
        }

        Ok(PictureLossIndication {
            sender_ssrc: raw_packet.get_u32(),
            media_ssrc: raw_packet.get_u32(),
        })
    }
}
