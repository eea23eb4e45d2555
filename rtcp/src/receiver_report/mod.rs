
use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::header::{Header, PacketType, COUNT_MAX, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::RtcpPacket;
use crate::reception_report::{ReceptionReport, RECEPTION_REPORT_LENGTH};
use crate::util::{get_padding_size, put_padding};

/// A ReceiverReport (RR) packet conveys reception statistics from a
/// participant that is not an active sender.
///
/// RFC 3550, 6.4.2
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReceiverReport {
    /// The synchronization source of the packet originator.
    pub ssrc: u32,
    /// Zero to 31 reception report blocks.
    pub reports: Vec<ReceptionReport>,
    /// Profile-specific extension bytes following the report blocks.
    pub profile_extensions: Bytes,
}

impl RtcpPacket for ReceiverReport {
    fn header(&self) -> Header {
        Header {
            padding: get_padding_size(self.raw_size()) != 0,
            count: self.reports.len() as u8,
            packet_type: PacketType::ReceiverReport,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|r| r.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + SSRC_LENGTH
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

        for report in &self.reports {
            report.marshal_to(&mut buf)?;
        }

        buf.extend_from_slice(&self.profile_extensions);
        put_padding(&mut buf, self.raw_size());

        Ok(buf.freeze())
    }
}

impl ReceiverReport {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::ReceiverReport {
            return Err(Error::WrongType);
        }

        if raw_packet.remaining() < SSRC_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let ssrc = raw_packet.get_u32();

        let mut reports = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            reports.push(ReceptionReport::unmarshal(raw_packet)?);
        }
        let profile_extensions = raw_packet.copy_to_bytes(raw_packet.remaining());

        Ok(ReceiverReport {
            ssrc,
            reports,
            profile_extensions,
        })
    }
}
