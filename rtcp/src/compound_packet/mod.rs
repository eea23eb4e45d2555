#[cfg(test)]
mod compound_packet_test;

use bytes::{Buf, Bytes};

use crate::error::{Error, Result};
use crate::header::Header;
use crate::packet::{self, Packet, RtcpPacket};
use crate::source_description::SdesType;

/// A CompoundPacket is a collection of RTCP packets transmitted as a
/// single datagram, subject to the RFC 3550 compounding rules: it must
/// start with an SR or RR, and an SDES carrying a CNAME must precede
/// any other packet type.
///
/// RFC 3550, 6.1
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompoundPacket(pub Vec<Packet>);

impl CompoundPacket {
    /// Checks the packet sequence against the compounding format
    /// rules.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::EmptyCompound);
        }

        // The first packet must always be a sender or receiver report.
        if !matches!(
            self.0[0],
            Packet::SenderReport(_) | Packet::ReceiverReport(_)
        ) {
            return Err(Error::BadFirstPacket);
        }

        for packet in &self.0[1..] {
            match packet {
                // Supplementary receiver reports are allowed before
                // the SDES.
                Packet::ReceiverReport(_) => continue,
                Packet::SourceDescription(sdes) => {
                    let has_cname = sdes.chunks.iter().any(|chunk| {
                        chunk
                            .items
                            .iter()
                            .any(|item| item.sdes_type == SdesType::Cname)
                    });
                    if has_cname {
                        return Ok(());
                    }
                    return Err(Error::MissingCname);
                }
                _ => return Err(Error::PacketBeforeCname),
            }
        }

        Err(Error::MissingCname)
    }

    /// Returns the CNAME carried in the first SDES packet.
    pub fn cname(&self) -> Result<String> {
        self.validate()?;

        for packet in &self.0 {
            if let Packet::SourceDescription(sdes) = packet {
                for chunk in &sdes.chunks {
                    for item in &chunk.items {
                        if item.sdes_type == SdesType::Cname {
                            return Ok(item.text.clone());
                        }
                    }
                }
            }
        }

        Err(Error::MissingCname)
    }

    pub fn destination_ssrc(&self) -> Vec<u32> {
        self.0
            .first()
            .map(Packet::destination_ssrc)
            .unwrap_or_default()
    }

    /// Validates and serializes the compound into one datagram.
    pub fn marshal(&self) -> Result<Bytes> {
        self.validate()?;
        packet::marshal(&self.0)
    }

    /// Parses a datagram and checks the result against the compound
    /// rules.
    pub fn unmarshal(raw_data: &mut impl Buf) -> Result<Self> {
        let compound = CompoundPacket(packet::unmarshal(raw_data)?);
        compound.validate()?;
        Ok(compound)
    }

    pub fn header(&self) -> Option<Header> {
        self.0.first().map(Packet::header)
    }
}
