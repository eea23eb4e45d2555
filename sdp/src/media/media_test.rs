use super::*;

#[test]
fn test_attribute_missing() {
    let media = MediaDescription::default();
    assert_eq!(media.attribute("recvonly"), None);
}

#[test]
fn test_attribute_present_with_no_value() {
    let media = MediaDescription::default().with_property_attribute("recvonly".to_owned());
    assert_eq!(media.attribute("recvonly"), Some(None));
}

#[test]
fn test_attribute_present_with_value() {
    let media = MediaDescription::default().with_value_attribute("ptime".to_owned(), "1".to_owned());
    assert_eq!(media.attribute("ptime"), Some(Some("1")));
}

#[test]
fn test_media_name_display() {
    let name = MediaName {
        media: "video".to_owned(),
        port: RangedPort {
            value: 51372,
            range: None,
        },
        protos: vec!["RTP".to_owned(), "SAVPF".to_owned()],
        formats: vec!["96".to_owned(), "98".to_owned()],
    };
    assert_eq!(name.to_string(), "video 51372 RTP/SAVPF 96 98");

    let ranged = MediaName {
        port: RangedPort {
            value: 12000,
            range: Some(2),
        },
        ..name
    };
    assert_eq!(ranged.to_string(), "video 12000/2 RTP/SAVPF 96 98");
}

#[test]
fn test_with_codec_formats_and_rtpmap() {
    let media = MediaDescription::new_jsep_media_description("audio".to_owned())
        .with_codec(111, "opus".to_owned(), 48000, 2, "minptime=10".to_owned());

    assert_eq!(media.media_name.formats, vec!["111"]);
    assert_eq!(media.attribute("rtpmap"), Some(Some("111 opus/48000/2")));
    assert_eq!(media.attribute("fmtp"), Some(Some("111 minptime=10")));
}
