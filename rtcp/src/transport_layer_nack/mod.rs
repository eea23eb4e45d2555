#[cfg(test)]
mod transport_layer_nack_test;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, FORMAT_TLN, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;

const NACK_PAIR_LENGTH: usize = 4;

/// A bitmask of the 16 packets following `packet_id`; a set bit `i`
/// reports `packet_id + i + 1` as lost.
pub type PacketBitmap = u16;

/// One generic NACK entry.
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |            PID                |             BLP               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct NackPair {
    /// The sequence number of the first lost packet.
    pub packet_id: u16,
    /// Bitmask of following lost packets.
    pub lost_packets: PacketBitmap,
}

impl NackPair {
    /// Expands the pair into the full list of lost sequence numbers it
    /// reports.
    pub fn packet_list(&self) -> Vec<u16> {
        let mut out = vec![self.packet_id];
        for i in 0..16u16 {
            if (self.lost_packets >> i) & 0x1 != 0 {
                out.push(self.packet_id.wrapping_add(i + 1));
            }
        }
        out
    }
}

/// Packs a sorted list of lost sequence numbers into as few NACK
/// pairs as the bitmap format allows.
pub fn nack_pairs_from_sequence_numbers(sequence_numbers: &[u16]) -> Vec<NackPair> {
    let mut pairs: Vec<NackPair> = vec![];

    for &seq in sequence_numbers {
        match pairs.last_mut() {
            Some(pair) if seq > pair.packet_id && seq - pair.packet_id <= 16 => {
                pair.lost_packets |= 1 << (seq - pair.packet_id - 1);
            }
            _ => pairs.push(NackPair {
                packet_id: seq,
                lost_packets: 0,
            }),
        }
    }

    pairs
}

/// A TransportLayerNack packet reports lost RTP packets by sequence
/// number.
///
/// RFC 4585, 6.2.1
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransportLayerNack {
    /// The SSRC of the sender of this packet.
    pub sender_ssrc: u32,
    /// The SSRC of the media source the losses pertain to.
    pub media_ssrc: u32,
    pub nacks: Vec<NackPair>,
}

impl RtcpPacket for TransportLayerNack {
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: FORMAT_TLN,
            packet_type: PacketType::TransportSpecificFeedback,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + 2 * SSRC_LENGTH + self.nacks.len() * NACK_PAIR_LENGTH
    }

    fn marshal(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;
        buf.extend_from_slice(&self.sender_ssrc.to_be_bytes());
        buf.extend_from_slice(&self.media_ssrc.to_be_bytes());

        for nack in &self.nacks {
            buf.extend_from_slice(&nack.packet_id.to_be_bytes());
            buf.extend_from_slice(&nack.lost_packets.to_be_bytes());
        }

        Ok(buf.freeze())
    }
}

impl TransportLayerNack {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::TransportSpecificFeedback
            || header.count != FORMAT_TLN
        {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < 2 * SSRC_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let sender_ssrc = raw_packet.get_u32();
        let media_ssrc = raw_packet.get_u32();

        let mut nacks = vec![];
        while raw_packet.remaining() >= NACK_PAIR_LENGTH {
            nacks.push(NackPair {
                packet_id: raw_packet.get_u16(),
                lost_packets: raw_packet.get_u16(),
            });
        }
        if raw_packet.has_remaining() {
            return Err(Error::PacketTooShort);
        }

        Ok(TransportLayerNack {
            sender_ssrc,
            media_ssrc,
            nacks,
        })
    }
}
