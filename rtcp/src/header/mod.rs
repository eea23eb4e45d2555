
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// The RTCP packet types registered with IANA.
/// See <https://www.iana.org/assignments/rtp-parameters/rtp-parameters.xhtml#rtp-parameters-4>
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    #[default]
    Unsupported = 0,
    SenderReport = 200,              // RFC 3550, 6.4.1
    ReceiverReport = 201,            // RFC 3550, 6.4.2
    SourceDescription = 202,         // RFC 3550, 6.5
    Goodbye = 203,                   // RFC 3550, 6.6
    ApplicationDefined = 204,        // RFC 3550, 6.7
    TransportSpecificFeedback = 205, // RFC 4585, 6.2
    PayloadSpecificFeedback = 206,   // RFC 4585, 6.3
    ExtendedReport = 207,            // RFC 3611
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            200 => PacketType::SenderReport,
            201 => PacketType::ReceiverReport,
            202 => PacketType::SourceDescription,
            203 => PacketType::Goodbye,
            204 => PacketType::ApplicationDefined,
            205 => PacketType::TransportSpecificFeedback,
            206 => PacketType::PayloadSpecificFeedback,
            207 => PacketType::ExtendedReport,
            _ => PacketType::Unsupported,
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PacketType::Unsupported => "Unsupported",
            PacketType::SenderReport => "SR",
            PacketType::ReceiverReport => "RR",
            PacketType::SourceDescription => "SDES",
            PacketType::Goodbye => "BYE",
            PacketType::ApplicationDefined => "APP",
            PacketType::TransportSpecificFeedback => "TSFB",
            PacketType::PayloadSpecificFeedback => "PSFB",
            PacketType::ExtendedReport => "XR",
        };
        write!(f, "{s}")
    }
}

// Feedback packets overload the count field as a message format.
pub const FORMAT_TLN: u8 = 1;
pub const FORMAT_RRR: u8 = 5;
pub const FORMAT_PLI: u8 = 1;
pub const FORMAT_SLI: u8 = 2;

pub const RTP_VERSION: u8 = 2;

const VERSION_SHIFT: u8 = 6;
const VERSION_MASK: u8 = 0x3;
const PADDING_SHIFT: u8 = 5;
const PADDING_MASK: u8 = 0x1;
const COUNT_MASK: u8 = 0x1f;

pub const HEADER_LENGTH: usize = 4;
pub const COUNT_MAX: usize = (1 << 5) - 1;
pub const SSRC_LENGTH: usize = 4;

/// The common header shared by every RTCP packet.
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|    RC   |      PT       |             length            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Header {
    /// When set, this packet carries additional padding octets at the
    /// end that are counted in the length but are not control
    /// information.
    pub padding: bool,
    /// The number of reception reports, sources, or chunks in this
    /// packet, or the feedback format for feedback types.
    pub count: u8,
    /// The RTCP packet type.
    pub packet_type: PacketType,
    /// The length of this packet in 32-bit words minus one, including
    /// the header and any padding.
    pub length: u16,
}

impl Header {
    pub fn marshal(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(HEADER_LENGTH);
        self.marshal_to(&mut buf)?;
        Ok(buf.freeze())
    }

    pub fn marshal_to(&self, buf: &mut impl BufMut) -> Result<()> {
        if self.count > COUNT_MAX as u8 {
            return Err(Error::InvalidHeader);
        }

        let b0 = (RTP_VERSION << VERSION_SHIFT)
            | (u8::from(self.padding) << PADDING_SHIFT)
            | (self.count & COUNT_MASK);

        buf.put_u8(b0);
        buf.put_u8(self.packet_type as u8);
        buf.put_u16(self.length);
        Ok(())
    }

    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }

        let b0 = raw_packet.get_u8();
        let version = (b0 >> VERSION_SHIFT) & VERSION_MASK;
        if version != RTP_VERSION {
            return Err(Error::BadVersion);
        }

        Ok(Header {
            padding: ((b0 >> PADDING_SHIFT) & PADDING_MASK) > 0,
            count: b0 & COUNT_MASK,
            packet_type: PacketType::from(raw_packet.get_u8()),
            length: raw_packet.get_u16(),
        })
    }
}
