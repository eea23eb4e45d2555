#[cfg(test)]
mod reception_report_test;

use bytes::{Buf, BufMut};

use crate::error::{Error, Result};

pub const RECEPTION_REPORT_LENGTH: usize = 24;

// Cumulative packets lost is a signed 24-bit quantity.
const MAX_TOTAL_LOST: u32 = (1 << 23) - 1;

/// A ReceptionReport block conveys statistics on the reception of RTP
/// packets from a single synchronization source.
///
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                              SSRC                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | fraction lost |       cumulative number of packets lost       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           extended highest sequence number received           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      interarrival jitter                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         last SR (LSR)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   delay since last SR (DLSR)                  |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ReceptionReport {
    /// The SSRC of the source this report pertains to.
    pub ssrc: u32,
    /// The fraction of RTP packets from the source lost since the
    /// previous report, as a fixed-point number with the binary point
    /// at the left edge.
    pub fraction_lost: u8,
    /// The total number of RTP packets lost since the beginning of
    /// reception, capped at 2^23 - 1.
    pub total_lost: u32,
    /// The low 16 bits hold the highest sequence number received, the
    /// high 16 bits the count of sequence number cycles.
    pub last_sequence_number: u32,
    /// An estimate of the statistical variance of interarrival time,
    /// in timestamp units.
    pub jitter: u32,
    /// The middle 32 bits of the NTP timestamp from the most recent SR
    /// from this source, or zero.
    pub last_sender_report: u32,
    /// The delay between receiving the last SR and sending this
    /// report, in 1/65536 seconds, or zero.
    pub delay: u32,
}

impl ReceptionReport {
    pub(crate) fn marshal_to(&self, buf: &mut impl BufMut) -> Result<()> {
        if self.total_lost > MAX_TOTAL_LOST {
            return Err(Error::InvalidTotalLost);
        }

        buf.put_u32(self.ssrc);
        buf.put_u8(self.fraction_lost);
        buf.put_u8(((self.total_lost >> 16) & 0xFF) as u8);
        buf.put_u8(((self.total_lost >> 8) & 0xFF) as u8);
        buf.put_u8((self.total_lost & 0xFF) as u8);
        buf.put_u32(self.last_sequence_number);
        buf.put_u32(self.jitter);
        buf.put_u32(self.last_sender_report);
        buf.put_u32(self.delay);
        Ok(())
    }

    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        if raw_packet.remaining() < RECEPTION_REPORT_LENGTH {
            return Err(Error::PacketTooShort);
        }

        let ssrc = raw_packet.get_u32();
        let fraction_lost = raw_packet.get_u8();

        let t0 = u32::from(raw_packet.get_u8());
        let t1 = u32::from(raw_packet.get_u8());
        let t2 = u32::from(raw_packet.get_u8());
        let total_lost = (t0 << 16) | (t1 << 8) | t2;

        Ok(ReceptionReport {
            ssrc,
            fraction_lost,
            total_lost,
            last_sequence_number: raw_packet.get_u32(),
            jitter: raw_packet.get_u32(),
            last_sender_report: raw_packet.get_u32(),
            delay: raw_packet.get_u32(),
        })
    }
}
