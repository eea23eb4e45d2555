
use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, COUNT_MAX, HEADER_LENGTH};
use crate::packet::RtcpPacket;
use crate::reception_report::{ReceptionReport, RECEPTION_REPORT_LENGTH};
use crate::util::{get_padding_size, put_padding};

// SSRC + NTP timestamp + RTP timestamp + packet count + octet count.
pub(crate) const SENDER_INFO_LENGTH: usize = 24;

/// A SenderReport (SR) packet conveys transmission and reception
/// statistics from an active sender.
///
/// RFC 3550, 6.4.1
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SenderReport {
    /// The synchronization source of this sender.
    pub ssrc: u32,
    /// The wallclock time when this report was sent, in 64-bit NTP
    /// format.
    pub ntp_time: u64,
    /// The same instant as `ntp_time` expressed in the units of the
    /// RTP media clock.
    pub rtp_time: u32,
    /// Total RTP data packets transmitted since starting transmission.
    pub packet_count: u32,
    /// Total payload octets transmitted since starting transmission.
    pub octet_count: u32,
    /// Zero to 31 reception report blocks.
    pub reports: Vec<ReceptionReport>,
    /// Profile-specific extension bytes following the report blocks.
    pub profile_extensions: Bytes,
}

impl RtcpPacket for SenderReport {
    fn header(&self) -> Header {
        Header {
            padding: get_padding_size(self.raw_size()) != 0,
            count: self.reports.len() as u8,
            packet_type: PacketType::SenderReport,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|r| r.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + SENDER_INFO_LENGTH
            + self.reports.len() * RECEPTION_REPORT_LENGTH
            + self.profile_extensions.len()
    }

    fn marshal(&self) -> Result<Bytes> {
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports);
        }

        let mut buf = BytesMut::with_capacity(self.marshal_size());
        self.header().marshal_to(&mut buf)?;

        buf.extend_from_slice(&self.ssrc.to_be_bytes());
        buf.extend_from_slice(&self.ntp_time.to_be_bytes());
        buf.extend_from_slice(&self.rtp_time.to_be_bytes());
        buf.extend_from_slice(&self.packet_count.to_be_bytes());
        buf.extend_from_slice(&self.octet_count.to_be_bytes());

        for report in &self.reports {
            report.marshal_to(&mut buf)?;
        }

        buf.extend_from_slice(&self.profile_extensions);
        put_padding(&mut buf, self.raw_size());

        Ok(buf.freeze())
    }
}

impl SenderReport {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::SenderReport {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < SENDER_INFO_LENGTH {
            return Err(Error::PacketTooShort);
        }

        let ssrc = raw_packet.get_u32();
        let ntp_time = raw_packet.get_u64();
        let rtp_time = raw_packet.get_u32();
        let packet_count = raw_packet.get_u32();
        let octet_count = raw_packet.get_u32();

        let mut reports = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            reports.push(ReceptionReport::unmarshal(raw_packet)?);
        }
        let profile_extensions = raw_packet.copy_to_bytes(raw_packet.remaining());

        Ok(SenderReport {
            ssrc,
            ntp_time,
            rtp_time,
            packet_count,
            octet_count,
            reports,
            profile_extensions,
        })
    }
}
