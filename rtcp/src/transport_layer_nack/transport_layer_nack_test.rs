use bytes::Bytes;

use super::*;
use crate::error::Error;
use crate::packet::RtcpPacket;

#[test]
fn test_transport_layer_nack_roundtrip() {
    let packet = TransportLayerNack {
        sender_ssrc: 0x902f9e2e,
        media_ssrc: 0x902f9e2e,
        nacks: vec![NackPair {
            packet_id: 0xaaa,
            lost_packets: 0b0010_0000_0000_0101,
        }],
    };

    let data = packet.marshal().expect("marshal");
    assert_eq!(data.len() % 4, 0);
    assert_eq!(usize::from(packet.header().length), data.len() / 4 - 1);

    let mut buf = data.clone();
    let got = TransportLayerNack::unmarshal(&mut buf).expect("unmarshal");
    assert_eq!(got, packet);
}

#[test]
fn test_nack_pair_packet_list() {
    let tests = vec![
        (
            NackPair {
                packet_id: 42,
                lost_packets: 0,
            },
            vec![42u16],
        ),
        (
            NackPair {
                packet_id: 42,
                lost_packets: 0b0000_0001,
            },
            vec![42, 43],
        ),
        (
            NackPair {
                packet_id: 42,
                lost_packets: 0b0000_0011,
            },
            vec![42, 43, 44],
        ),
        (
            NackPair {
                packet_id: 42,
                lost_packets: 0b1000_0000_0000_0001,
            },
            vec![42, 43, 58],
        ),
        // Sequence number wraparound.
        (
            NackPair {
                packet_id: 65534,
                lost_packets: 0b0000_0011,
            },
            vec![65534, 65535, 0],
        ),
    ];

    for (pair, want) in tests {
        assert_eq!(pair.packet_list(), want, "packet_id={}", pair.packet_id);
    }
}

#[test]
fn test_nack_pairs_from_sequence_numbers() {
    let pairs = nack_pairs_from_sequence_numbers(&[42, 43, 44, 58, 100]);
    assert_eq!(
        pairs,
        vec![
            NackPair {
                packet_id: 42,
                lost_packets: 0b1000_0000_0000_0011,
            },
            NackPair {
                packet_id: 100,
                lost_packets: 0,
            },
        ]
    );

    // Expansion reproduces the input.
    let mut expanded = vec![];
    for pair in &pairs {
        expanded.extend(pair.packet_list());
    }
    assert_eq!(expanded, vec![42, 43, 44, 58, 100]);
}

#[test]
fn test_transport_layer_nack_wrong_type() {
    let mut data = Bytes::from_static(&[
        0x85, 0xcd, 0x00, 0x02, // fmt=5 is RRR
        0x90, 0x2f, 0x9e, 0x2e, 0x90, 0x2f, 0x9e, 0x2e,
    ]);
    assert_eq!(
        TransportLayerNack::unmarshal(&mut data),
        Err(Error::WrongType)
    );
}
