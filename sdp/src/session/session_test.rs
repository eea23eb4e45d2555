use url::Url;

use super::*;
use crate::codecs::Codec;
use crate::common::*;
use crate::error::{Error, Result};
use crate::media::{MediaDescription, MediaName, RangedPort};

const CANONICAL_MARSHAL_SDP: &str = "v=0\r\n\
     o=jdoe 2890844526 2890842807 IN IP4 10.47.16.5\r\n\
     s=SDP Seminar\r\n\
     i=A Seminar on the session description protocol\r\n\
     u=http://www.example.com/seminars/sdp.pdf\r\n\
     e=j.doe@example.com (Jane Doe)\r\n\
     p=+1 617 555-6011\r\n\
     c=IN IP4 224.2.17.12/127\r\n\
     b=X-YZ:128\r\n\
     b=AS:12345\r\n\
     t=2873397496 2873404696\r\n\
     t=3034423619 3042462419\r\n\
     r=604800 3600 0 90000\r\n\
     z=2882844526 -3600 2898848070 0\r\n\
     k=prompt\r\n\
     a=candidate:0 1 UDP 2113667327 203.0.113.1 54400 typ host\r\n\
     a=recvonly\r\n\
     m=audio 49170 RTP/AVP 0\r\n\
     i=Vivamus a posuere nisl\r\n\
     c=IN IP4 203.0.113.1\r\n\
     b=X-YZ:128\r\n\
     k=prompt\r\n\
     a=sendrecv\r\n\
     m=video 51372 RTP/AVP 99\r\n\
     a=rtpmap:99 h263-1998/90000\r\n";

fn canonical_session_description() -> SessionDescription {
    SessionDescription {
        version: 0,
        origin: Origin {
            username: "jdoe".to_owned(),
            session_id: 2890844526,
            session_version: 2890842807,
            network_type: "IN".to_owned(),
            address_type: "IP4".to_owned(),
            unicast_address: "10.47.16.5".to_owned(),
        },
        session_name: "SDP Seminar".to_owned(),
        session_information: Some("A Seminar on the session description protocol".to_owned()),
        uri: Some(Url::parse("http://www.example.com/seminars/sdp.pdf").unwrap()),
        email_address: Some("j.doe@example.com (Jane Doe)".to_owned()),
        phone_number: Some("+1 617 555-6011".to_owned()),
        connection_information: Some(ConnectionInformation {
            network_type: "IN".to_owned(),
            address_type: "IP4".to_owned(),
            address: Some(Address {
                address: "224.2.17.12".to_owned(),
                ttl: Some(127),
                range: None,
            }),
        }),
        bandwidth: vec![
            Bandwidth {
                experimental: true,
                bandwidth_type: "YZ".to_owned(),
                bandwidth: 128,
            },
            Bandwidth {
                experimental: false,
                bandwidth_type: "AS".to_owned(),
                bandwidth: 12345,
            },
        ],
        time_descriptions: vec![
            TimeDescription {
                timing: Timing {
                    start_time: 2873397496,
                    stop_time: 2873404696,
                },
                repeat_times: vec![],
            },
            TimeDescription {
                timing: Timing {
                    start_time: 3034423619,
                    stop_time: 3042462419,
                },
                repeat_times: vec![RepeatTime {
                    interval: 604800,
                    duration: 3600,
                    offsets: vec![0, 90000],
                }],
            },
        ],
        time_zones: vec![
            TimeZone {
                adjustment_time: 2882844526,
                offset: -3600,
            },
            TimeZone {
                adjustment_time: 2898848070,
                offset: 0,
            },
        ],
        encryption_key: Some("prompt".to_owned()),
        attributes: vec![
            Attribute::new(
                "candidate".to_owned(),
                Some("0 1 UDP 2113667327 203.0.113.1 54400 typ host".to_owned()),
            ),
            Attribute::new("recvonly".to_owned(), None),
        ],
        media_descriptions: vec![
            MediaDescription {
                media_name: MediaName {
                    media: "audio".to_owned(),
                    port: RangedPort {
                        value: 49170,
                        range: None,
                    },
                    protos: vec!["RTP".to_owned(), "AVP".to_owned()],
                    formats: vec!["0".to_owned()],
                },
                media_title: Some("Vivamus a posuere nisl".to_owned()),
                connection_information: Some(ConnectionInformation {
                    network_type: "IN".to_owned(),
                    address_type: "IP4".to_owned(),
                    address: Some(Address {
                        address: "203.0.113.1".to_owned(),
                        ttl: None,
                        range: None,
                    }),
                }),
                bandwidth: vec![Bandwidth {
                    experimental: true,
                    bandwidth_type: "YZ".to_owned(),
                    bandwidth: 128,
                }],
                encryption_key: Some("prompt".to_owned()),
                attributes: vec![Attribute::new("sendrecv".to_owned(), None)],
            },
            MediaDescription {
                media_name: MediaName {
                    media: "video".to_owned(),
                    port: RangedPort {
                        value: 51372,
                        range: None,
                    },
                    protos: vec!["RTP".to_owned(), "AVP".to_owned()],
                    formats: vec!["99".to_owned()],
                },
                attributes: vec![Attribute::new(
                    "rtpmap".to_owned(),
                    Some("99 h263-1998/90000".to_owned()),
                )],
                ..MediaDescription::default()
            },
        ],
    }
}

#[test]
fn test_unmarshal_canonical() -> Result<()> {
    let parsed = SessionDescription::unmarshal(CANONICAL_MARSHAL_SDP)?;
    assert_eq!(parsed, canonical_session_description());
    Ok(())
}

#[test]
fn test_marshal_canonical() {
    let actual = canonical_session_description().marshal();
    assert_eq!(actual, CANONICAL_MARSHAL_SDP);
}

#[test]
fn test_unmarshal_marshal_roundtrip() -> Result<()> {
    let parsed = SessionDescription::unmarshal(CANONICAL_MARSHAL_SDP)?;
    assert_eq!(parsed.marshal(), CANONICAL_MARSHAL_SDP);
    Ok(())
}

#[test]
fn test_unmarshal_accepts_bare_newlines() -> Result<()> {
    let input = CANONICAL_MARSHAL_SDP.replace("\r\n", "\n");
    let parsed = SessionDescription::unmarshal(&input)?;
    assert_eq!(parsed, canonical_session_description());

    // Emission always prefers CRLF.
    assert_eq!(parsed.marshal(), CANONICAL_MARSHAL_SDP);
    Ok(())
}

#[test]
fn test_new_jsep_session_description() {
    let desc = SessionDescription::new_jsep_session_description(false);

    assert_eq!(desc.version, 0);
    assert_eq!(desc.origin.username, "-");
    assert_eq!(desc.origin.network_type, "IN");
    assert_eq!(desc.origin.address_type, "IP4");
    assert_eq!(desc.origin.unicast_address, "0.0.0.0");
    // The top bit of the session id must be zero.
    assert_eq!(desc.origin.session_id >> 63, 0);
    assert_eq!(desc.session_name, "-");
    assert_eq!(desc.time_descriptions.len(), 1);
    assert_eq!(desc.time_descriptions[0].timing, Timing::default());
    assert!(!desc.has_attribute(ATTR_KEY_IDENTITY));

    let desc = SessionDescription::new_jsep_session_description(true);
    assert!(desc.has_attribute(ATTR_KEY_IDENTITY));
}

#[test]
fn test_jsep_media_description_roundtrip() -> Result<()> {
    let desc = SessionDescription::new_jsep_session_description(false)
        .with_fingerprint(
            "sha-256".to_owned(),
            "79:42:25:4D:9E:A7:6B:48:52:B6:43:57:67:D9:D7:51:E2:B4:34:D2:A8:C0:B6:38:50:7C:26:72:8C:25:9C:52".to_owned(),
        )
        .with_media(
            MediaDescription::new_jsep_media_description("video".to_owned())
                .with_ice_credentials("someufrag".to_owned(), "somepwd".to_owned())
                .with_value_attribute(
                    ATTR_KEY_CONNECTION_SETUP.to_owned(),
                    "active".to_owned(),
                )
                .with_value_attribute(ATTR_KEY_MID.to_owned(), "video".to_owned())
                .with_property_attribute(ATTR_KEY_RTCPMUX.to_owned())
                .with_property_attribute(ATTR_KEY_RTCPRSIZE.to_owned())
                .with_codec(96, "VP8".to_owned(), 90000, 0, String::new())
                .with_media_source(
                    12345,
                    "cname".to_owned(),
                    "stream-label".to_owned(),
                    "label".to_owned(),
                ),
        );

    let text = desc.marshal();
    let reparsed = SessionDescription::unmarshal(&text)?;
    assert_eq!(reparsed, desc);

    let media = &reparsed.media_descriptions[0];
    assert_eq!(media.media_name.media, "video");
    assert_eq!(
        media.media_name.protos,
        vec!["UDP", "TLS", "RTP", "SAVPF"]
    );
    assert_eq!(media.media_name.formats, vec!["96"]);
    assert_eq!(media.attribute("ice-ufrag"), Some(Some("someufrag")));
    assert_eq!(media.attribute("ice-pwd"), Some(Some("somepwd")));
    assert_eq!(media.attribute("rtpmap"), Some(Some("96 VP8/90000")));
    assert!(media.has_attribute("ssrc"));
    Ok(())
}

#[test]
fn test_unmarshal_webrtc_offer_roundtrip() -> Result<()> {
    // A trimmed browser-style offer: bundle group, per-media ICE
    // credentials and DTLS setup role, ssrc lines.
    let input = "v=0\r\n\
         o=- 4596489990601351948 2 IN IP4 0.0.0.0\r\n\
         s=-\r\n\
         t=0 0\r\n\
         a=group:BUNDLE audio video\r\n\
         a=msid-semantic: WMS stream\r\n\
         a=fingerprint:sha-256 19:E2:1C:3B:4B:9F:81:E6:B8:5C:F4:A5:A8:D8:73:04:BB:05:2F:70:9F:04:A9:0E:05:E9:26:33:E8:70:88:A2\r\n\
         m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
         c=IN IP4 0.0.0.0\r\n\
         a=rtcp:9 IN IP4 0.0.0.0\r\n\
         a=ice-ufrag:ysXtngCJHCkQRTMj\r\n\
         a=ice-pwd:tICkJJLzzSEyPKfhYzNHLLcA\r\n\
         a=setup:active\r\n\
         a=mid:audio\r\n\
         a=sendrecv\r\n\
         a=rtcp-mux\r\n\
         a=rtpmap:111 opus/48000/2\r\n\
         a=fmtp:111 minptime=10;useinbandfec=1\r\n\
         a=ssrc:3218122169 cname:prfCL8xUKzYTqGXi\r\n\
         m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
         c=IN IP4 0.0.0.0\r\n\
         a=ice-ufrag:ysXtngCJHCkQRTMj\r\n\
         a=ice-pwd:tICkJJLzzSEyPKfhYzNHLLcA\r\n\
         a=setup:active\r\n\
         a=mid:video\r\n\
         a=sendrecv\r\n\
         a=rtcp-mux\r\n\
         a=rtpmap:96 VP8/90000\r\n\
         a=rtcp-fb:96 nack pli\r\n\
         a=ssrc:2775379175 cname:prfCL8xUKzYTqGXi\r\n";

    let desc = SessionDescription::unmarshal(input)?;
    assert_eq!(desc.marshal(), input);

    assert_eq!(
        desc.attribute(ATTR_KEY_GROUP),
        Some(&"BUNDLE audio video".to_owned())
    );
    assert_eq!(desc.media_descriptions.len(), 2);

    let audio = &desc.media_descriptions[0];
    assert_eq!(audio.media_name.media, "audio");
    assert_eq!(
        audio.attribute("ice-ufrag"),
        Some(Some("ysXtngCJHCkQRTMj"))
    );
    assert_eq!(audio.attribute(ATTR_KEY_CONNECTION_SETUP), Some(Some("active")));
    assert!(audio.has_attribute(ATTR_KEY_RTCPMUX));

    let opus = desc.get_codec_for_payload_type(111)?;
    assert_eq!(opus.name, "opus");
    assert_eq!(opus.encoding_parameters, "2");
    assert_eq!(opus.fmtp, "minptime=10;useinbandfec=1");

    Ok(())
}

#[test]
fn test_get_codec_for_payload_type() -> Result<()> {
    let input = "v=0\r\n\
         o=- 0 0 IN IP4 127.0.0.1\r\n\
         s=-\r\n\
         t=0 0\r\n\
         m=video 9 UDP/TLS/RTP/SAVPF 96 98\r\n\
         a=rtpmap:96 VP8/90000\r\n\
         a=rtpmap:98 VP9/90000\r\n\
         a=fmtp:98 profile-id=0\r\n\
         a=rtcp-fb:98 nack pli\r\n";

    let desc = SessionDescription::unmarshal(input)?;

    let vp8 = desc.get_codec_for_payload_type(96)?;
    assert_eq!(vp8.name, "VP8");
    assert_eq!(vp8.clock_rate, 90000);

    let vp9 = desc.get_codec_for_payload_type(98)?;
    assert_eq!(vp9.name, "VP9");
    assert_eq!(vp9.fmtp, "profile-id=0");
    assert_eq!(vp9.rtcp_feedback, vec!["nack pli"]);

    assert_eq!(
        desc.get_codec_for_payload_type(111),
        Err(Error::PayloadTypeNotFound)
    );

    let wanted = Codec {
        name: "vp9".to_owned(),
        fmtp: "profile-id=0".to_owned(),
        ..Codec::default()
    };
    assert_eq!(desc.get_payload_type_for_codec(&wanted)?, 98);

    Ok(())
}
