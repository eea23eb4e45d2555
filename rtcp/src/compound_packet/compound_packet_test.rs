use bytes::Bytes;

use super::*;
use crate::error::{Error, Result};
use crate::goodbye::Goodbye;
use crate::packet::Packet;
use crate::receiver_report::ReceiverReport;
use crate::sender_report::SenderReport;
use crate::source_description::{
    SdesType, SourceDescription, SourceDescriptionChunk, SourceDescriptionItem,
};

fn cname_sdes() -> Packet {
    Packet::SourceDescription(SourceDescription {
        chunks: vec![SourceDescriptionChunk {
            source: 1234,
            items: vec![SourceDescriptionItem {
                sdes_type: SdesType::Cname,
                text: "cname".to_owned(),
            }],
        }],
    })
}

fn rr() -> Packet {
    Packet::ReceiverReport(ReceiverReport {
        ssrc: 1234,
        ..ReceiverReport::default()
    })
}

fn sr() -> Packet {
    Packet::SenderReport(SenderReport {
        ssrc: 1234,
        ..SenderReport::default()
    })
}

#[test]
fn test_compound_validate() {
    let tests = vec![
        (
            "empty",
            CompoundPacket(vec![]),
            Some(Error::EmptyCompound),
        ),
        (
            "no cname",
            CompoundPacket(vec![sr()]),
            Some(Error::MissingCname),
        ),
        (
            "just bye",
            CompoundPacket(vec![Packet::Goodbye(Goodbye::default())]),
            Some(Error::BadFirstPacket),
        ),
        (
            "sdes missing cname",
            CompoundPacket(vec![
                sr(),
                Packet::SourceDescription(SourceDescription {
                    chunks: vec![SourceDescriptionChunk {
                        source: 1234,
                        items: vec![SourceDescriptionItem {
                            sdes_type: SdesType::Note,
                            text: "note".to_owned(),
                        }],
                    }],
                }),
            ]),
            Some(Error::MissingCname),
        ),
        (
            "bye before cname",
            CompoundPacket(vec![
                sr(),
                Packet::Goodbye(Goodbye::default()),
                cname_sdes(),
            ]),
            Some(Error::PacketBeforeCname),
        ),
        ("sr + cname", CompoundPacket(vec![sr(), cname_sdes()]), None),
        ("rr + cname", CompoundPacket(vec![rr(), cname_sdes()]), None),
        (
            "sr + rr + cname",
            CompoundPacket(vec![sr(), rr(), cname_sdes()]),
            None,
        ),
    ];

    for (name, compound, want_error) in tests {
        let got = compound.validate();
        match want_error {
            Some(err) => assert_eq!(got, Err(err), "{name}"),
            None => assert!(got.is_ok(), "{name}: {got:?}"),
        }
    }
}

#[test]
fn test_compound_cname() -> Result<()> {
    let compound = CompoundPacket(vec![sr(), rr(), cname_sdes()]);
    assert_eq!(compound.cname()?, "cname");
    Ok(())
}

#[test]
fn test_compound_roundtrip() -> Result<()> {
    let compound = CompoundPacket(vec![rr(), cname_sdes()]);

    let data = compound.marshal()?;
    let mut buf = data.clone();
    let got = CompoundPacket::unmarshal(&mut buf)?;
    assert_eq!(got, compound);
    Ok(())
}

#[test]
fn test_compound_unmarshal_rejects_bad_compound() {
    // BYE alone parses as packets but fails compound validation.
    let bye = Packet::Goodbye(Goodbye {
        sources: vec![1],
        reason: String::new(),
    });
    let data = crate::packet::marshal(&[bye]).expect("marshal");

    let mut buf = Bytes::copy_from_slice(&data);
    assert_eq!(
        CompoundPacket::unmarshal(&mut buf),
        Err(Error::BadFirstPacket)
    );
}
