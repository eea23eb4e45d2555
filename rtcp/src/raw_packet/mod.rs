#[cfg(test)]
mod raw_packet_test;

use bytes::{Buf, Bytes};

use crate::error::Result;
use crate::header::Header;
use crate::packet::RtcpPacket;

/// RawPacket preserves an unknown RTCP packet type byte-for-byte,
/// header included.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawPacket(pub Bytes);

impl RtcpPacket for RawPacket {
    fn header(&self) -> Header {
        let mut buf = self.0.clone();
        Header::unmarshal(&mut buf).unwrap_or_default()
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }

    fn raw_size(&self) -> usize {
        self.0.len()
    }

    fn marshal(&self) -> Result<Bytes> {
        Ok(self.0.clone())
    }
}

impl RawPacket {
    pub fn unmarshal(raw_packet: &mut impl Buf) -> Result<Self> {
        let bytes = raw_packet.copy_to_bytes(raw_packet.remaining());

        // The header must at least parse, everything after it is kept
        // opaque.
        let mut header_buf = bytes.clone();
        Header::unmarshal(&mut header_buf)?;

        Ok(RawPacket(bytes))
    }
}
