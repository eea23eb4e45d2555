
use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::goodbye::Goodbye;
use crate::header::{
    Header, PacketType, FORMAT_PLI, FORMAT_RRR, FORMAT_SLI, FORMAT_TLN, HEADER_LENGTH,
};
use crate::picture_loss_indication::PictureLossIndication;
use crate::rapid_resynchronization_request::RapidResynchronizationRequest;
use crate::raw_packet::RawPacket;
use crate::receiver_report::ReceiverReport;
use crate::sender_report::SenderReport;
use crate::slice_loss_indication::SliceLossIndication;
use crate::source_description::SourceDescription;
use crate::transport_layer_nack::TransportLayerNack;
use crate::util::get_padding_size;

/// The operations every RTCP packet variant supports.
pub trait RtcpPacket {
    fn header(&self) -> Header;

    /// The SSRCs this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32>;

    /// Encoded size in bytes before trailing padding.
    fn raw_size(&self) -> usize;

    /// Encoded size in bytes, 32-bit aligned.
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        l + get_padding_size(l)
    }

    fn marshal(&self) -> Result<Bytes>;
}

/// One RTCP packet of any supported type. Unknown types are preserved
/// as [`Packet::Raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    SenderReport(SenderReport),
    ReceiverReport(ReceiverReport),
    SourceDescription(SourceDescription),
    Goodbye(Goodbye),
    PictureLossIndication(PictureLossIndication),
    SliceLossIndication(SliceLossIndication),
    TransportLayerNack(TransportLayerNack),
    RapidResynchronizationRequest(RapidResynchronizationRequest),
    Raw(RawPacket),
}

macro_rules! for_each_variant {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            Packet::SenderReport($p) => $body,
            Packet::ReceiverReport($p) => $body,
            Packet::SourceDescription($p) => $body,
            Packet::Goodbye($p) => $body,
            Packet::PictureLossIndication($p) => $body,
            Packet::SliceLossIndication($p) => $body,
            Packet::TransportLayerNack($p) => $body,
            Packet::RapidResynchronizationRequest($p) => $body,
            Packet::Raw($p) => $body,
        }
    };
}

impl RtcpPacket for Packet {
    fn header(&self) -> Header {
        for_each_variant!(self, p => p.header())
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        for_each_variant!(self, p => p.destination_ssrc())
    }

    fn raw_size(&self) -> usize {
        for_each_variant!(self, p => p.raw_size())
    }

    fn marshal(&self) -> Result<Bytes> {
        for_each_variant!(self, p => p.marshal())
    }
}

/// Serializes a sequence of packets into a single compound datagram.
pub fn marshal(packets: &[Packet]) -> Result<Bytes> {
    let mut out = BytesMut::new();
    for packet in packets {
        out.extend_from_slice(&packet.marshal()?);
    }
    Ok(out.freeze())
}

/// Parses an entire UDP datagram, which may hold several RTCP packets,
/// into the packets it contains. Unknown packet types never fail, they
/// come back as [`Packet::Raw`]; only header-level damage is an error.
pub fn unmarshal(raw_data: &mut impl Buf) -> Result<Vec<Packet>> {
    let mut packets = vec![];
    while raw_data.has_remaining() {
        packets.push(unmarshal_one(raw_data)?);
    }

    if packets.is_empty() {
        return Err(Error::InvalidHeader);
    }
    Ok(packets)
}

// Pulls the first RTCP packet off the stream and parses it to its
// concrete type, dispatching on packet type and, for the feedback
// types, on the format carried in the count field.
pub(crate) fn unmarshal_one(raw_data: &mut impl Buf) -> Result<Packet> {
    let header = Header::unmarshal(raw_data)?;

    let length = header.length as usize * 4;
    if length > raw_data.remaining() {
        return Err(Error::PacketTooShort);
    }
    let body = raw_data.copy_to_bytes(length);

    let mut full = BytesMut::with_capacity(HEADER_LENGTH + length);
    header.marshal_to(&mut full)?;
    full.extend_from_slice(&body);
    let mut full = full.freeze();

    let packet = match header.packet_type {
        PacketType::SenderReport => Packet::SenderReport(SenderReport::unmarshal(&mut full)?),
        PacketType::ReceiverReport => {
            Packet::ReceiverReport(ReceiverReport::unmarshal(&mut full)?)
        }
        PacketType::SourceDescription => {
            Packet::SourceDescription(SourceDescription::unmarshal(&mut full)?)
        }
        PacketType::Goodbye => Packet::Goodbye(Goodbye::unmarshal(&mut full)?),

        PacketType::TransportSpecificFeedback => match header.count {
            FORMAT_TLN => Packet::TransportLayerNack(TransportLayerNack::unmarshal(&mut full)?),
            FORMAT_RRR => Packet::RapidResynchronizationRequest(
                RapidResynchronizationRequest::unmarshal(&mut full)?,
            ),
            _ => Packet::Raw(RawPacket::unmarshal(&mut full)?),
        },
        PacketType::PayloadSpecificFeedback => match header.count {
            FORMAT_PLI => {
                Packet::PictureLossIndication(PictureLossIndication::unmarshal(&mut full)?)
            }
            FORMAT_SLI => Packet::SliceLossIndication(SliceLossIndication::unmarshal(&mut full)?),
            _ => Packet::Raw(RawPacket::unmarshal(&mut full)?),
        },

        _ => Packet::Raw(RawPacket::unmarshal(&mut full)?),
    };

    Ok(packet)
}
