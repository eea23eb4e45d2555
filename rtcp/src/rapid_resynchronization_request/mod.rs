#[cfg(test)]
mod rapid_resynchronization_request_test;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, FORMAT_RRR, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;

const RRR_LENGTH: usize = 2 * SSRC_LENGTH;

/// A RapidResynchronizationRequest (RRR) asks the sender for an ability
/// to resume decoding quickly, typically answered with a decoder
/// refresh point.
///
/// draft-perkins-avt-rapid-rtp-sync
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RapidResynchronizationRequest {
    /// The SSRC of the sender of this packet.
    pub sender_ssrc: u32,
    /// The SSRC of the media source to resynchronize against.
    pub media_ssrc: u32,
}

impl RtcpPacket for RapidResynchronizationRequest {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_RRR,
            packet_type: PacketType::TransportSpecificFeedback,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + RRR_LENGTH
    }

    fn marshal(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;
        buf.extend_from_slice(&self.sender_ssrc.to_be_bytes());
        buf.extend_from_slice(&self.media_ssrc.to_be_bytes());
        Ok(buf.freeze())
    }
}

impl RapidResynchronizationRequest {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::TransportSpecificFeedback
            || header.count != FORMAT_RRR
        {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < RRR_LENGTH {
            return Err(Error::PacketTooShort);
        }

        Ok(RapidResynchronizationRequest {
            sender_ssrc: raw_packet.get_u32(),
            media_ssrc: raw_packet.get_u32(),
        })
    }
}
