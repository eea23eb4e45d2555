#[cfg(test)]
mod session_test;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use crate::codecs::{
    codecs_match, merge_codecs, new_session_id, parse_fmtp, parse_rtcp_fb, parse_rtpmap, Codec,
};
use crate::common::*;
use crate::error::{Error, Result};
use crate::media::MediaDescription;
use crate::parser;

/// Attribute keys with JSEP-defined meaning.
pub const ATTR_KEY_CANDIDATE: &str = "candidate";
pub const ATTR_KEY_END_OF_CANDIDATES: &str = "end-of-candidates";
pub const ATTR_KEY_IDENTITY: &str = "identity";
pub const ATTR_KEY_GROUP: &str = "group";
pub const ATTR_KEY_SSRC: &str = "ssrc";
pub const ATTR_KEY_MSID: &str = "msid";
pub const ATTR_KEY_MSID_SEMANTIC: &str = "msid-semantic";
pub const ATTR_KEY_CONNECTION_SETUP: &str = "setup";
pub const ATTR_KEY_MID: &str = "mid";
pub const ATTR_KEY_ICELITE: &str = "ice-lite";
pub const ATTR_KEY_RTCPMUX: &str = "rtcp-mux";
pub const ATTR_KEY_RTCPRSIZE: &str = "rtcp-rsize";
pub const ATTR_KEY_INACTIVE: &str = "inactive";
pub const ATTR_KEY_RECV_ONLY: &str = "recvonly";
pub const ATTR_KEY_SEND_ONLY: &str = "sendonly";
pub const ATTR_KEY_SEND_RECV: &str = "sendrecv";

/// Version describes the "v=" field; JSEP pins it to 0.
pub type Version = isize;

/// SessionName describes the "s=" field, the textual session name.
pub type SessionName = String;

/// EmailAddress describes the "e=" field.
pub type EmailAddress = String;

/// PhoneNumber describes the "p=" field.
pub type PhoneNumber = String;

/// Origin defines the "o=" field: the session originator plus a
/// session identifier and version.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub network_type: String,
    pub address_type: String,
    pub unicast_address: String,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.network_type,
            self.address_type,
            self.unicast_address,
        )
    }
}

/// Timing defines the "t=" start/stop pair.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Timing {
    pub start_time: u64,
    pub stop_time: u64,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start_time, self.stop_time)
    }
}

/// RepeatTime describes an "r=" line: interval, active duration, and
/// offsets from the start time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepeatTime {
    pub interval: i64,
    pub duration: i64,
    pub offsets: Vec<i64>,
}

impl fmt::Display for RepeatTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interval, self.duration)?;
        for offset in &self.offsets {
            write!(f, " {offset}")?;
        }
        Ok(())
    }
}

/// TimeDescription groups one "t=" line with its "r=" lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TimeDescription {
    pub timing: Timing,
    pub repeat_times: Vec<RepeatTime>,
}

/// TimeZone is one adjustment-time/offset pair of the "z=" line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TimeZone {
    pub adjustment_time: u64,
    pub offset: i64,
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.adjustment_time, self.offset)
    }
}

/// SessionDescription carries everything needed to discover and
/// participate in a multimedia session.
///
/// <https://tools.ietf.org/html/rfc4566#section-5>
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    /// `v=0`
    pub version: Version,

    /// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
    pub origin: Origin,

    /// `s=<session name>`
    pub session_name: SessionName,

    /// `i=<session description>`
    pub session_information: Option<Information>,

    /// `u=<uri>`
    pub uri: Option<Url>,

    /// `e=<email-address>`
    pub email_address: Option<EmailAddress>,

    /// `p=<phone-number>`
    pub phone_number: Option<PhoneNumber>,

    /// `c=<nettype> <addrtype> <connection-address>`
    pub connection_information: Option<ConnectionInformation>,

    /// `b=<bwtype>:<bandwidth>`
    pub bandwidth: Vec<Bandwidth>,

    /// `t=` / `r=` blocks.
    pub time_descriptions: Vec<TimeDescription>,

    /// `z=<adjustment time> <offset> ...`
    pub time_zones: Vec<TimeZone>,

    /// `k=<method>[:<encryption key>]`
    pub encryption_key: Option<EncryptionKey>,

    /// Session-level `a=` lines.
    pub attributes: Vec<Attribute>,

    /// `m=` sections.
    pub media_descriptions: Vec<MediaDescription>,
}

// Emission order is fixed by the grammar; a canonical document
// round-trips to identical bytes.
impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key_value(f, "v=", Some(&self.version))?;
        write_key_value(f, "o=", Some(&self.origin))?;
        write_key_value(f, "s=", Some(&self.session_name))?;
        write_key_value(f, "i=", self.session_information.as_ref())?;
        write_key_value(f, "u=", self.uri.as_ref())?;
        write_key_value(f, "e=", self.email_address.as_ref())?;
        write_key_value(f, "p=", self.phone_number.as_ref())?;
        write_key_value(f, "c=", self.connection_information.as_ref())?;
        for bandwidth in &self.bandwidth {
            write_key_value(f, "b=", Some(bandwidth))?;
        }
        for time_description in &self.time_descriptions {
            write_key_value(f, "t=", Some(&time_description.timing))?;
            for repeat_time in &time_description.repeat_times {
                write_key_value(f, "r=", Some(repeat_time))?;
            }
        }
        if !self.time_zones.is_empty() {
            let zones: Vec<String> = self.time_zones.iter().map(TimeZone::to_string).collect();
            write_key_value(f, "z=", Some(&zones.join(" ")))?;
        }
        write_key_value(f, "k=", self.encryption_key.as_ref())?;
        for attribute in &self.attributes {
            write_key_value(f, "a=", Some(attribute))?;
        }
        for media_description in &self.media_descriptions {
            write!(f, "{media_description}")?;
        }
        Ok(())
    }
}

impl FromStr for SessionDescription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::unmarshal(s)
    }
}

impl SessionDescription {
    /// Serializes the description to its text form.
    pub fn marshal(&self) -> String {
        self.to_string()
    }

    /// Deserializes an SDP document. The parser is a deterministic
    /// finite-state machine over the 2-character line keys; see
    /// [`crate::parser`] for the state table.
    pub fn unmarshal(input: &str) -> Result<Self> {
        parser::parse(input)
    }

    /// Creates a session description with the boilerplate JSEP
    /// requires: a `-` username, a random 63-bit session id, and a
    /// zero start/stop timing line.
    pub fn new_jsep_session_description(identity: bool) -> Self {
        let desc = SessionDescription {
            version: 0,
            origin: Origin {
                username: "-".to_owned(),
                session_id: new_session_id(),
                session_version: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| u64::from(d.subsec_nanos()))
                    .unwrap_or_default(),
                network_type: "IN".to_owned(),
                address_type: "IP4".to_owned(),
                unicast_address: "0.0.0.0".to_owned(),
            },
            session_name: "-".to_owned(),
            time_descriptions: vec![TimeDescription::default()],
            ..SessionDescription::default()
        };

        if identity {
            desc.with_property_attribute(ATTR_KEY_IDENTITY.to_owned())
        } else {
            desc
        }
    }

    /// Adds a property attribute `a=key` at session level.
    pub fn with_property_attribute(mut self, key: String) -> Self {
        self.attributes.push(Attribute::new(key, None));
        self
    }

    /// Adds a value attribute `a=key:value` at session level.
    pub fn with_value_attribute(mut self, key: String, value: String) -> Self {
        self.attributes.push(Attribute::new(key, Some(value)));
        self
    }

    /// Adds a certificate fingerprint at session level.
    pub fn with_fingerprint(self, algorithm: String, value: String) -> Self {
        self.with_value_attribute("fingerprint".to_owned(), algorithm + " " + &value)
    }

    /// Appends a media section.
    pub fn with_media(mut self, md: MediaDescription) -> Self {
        self.media_descriptions.push(md);
        self
    }

    /// Returns whether a session-level attribute exists.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key == key)
    }

    /// Returns the value of a session-level attribute if present.
    pub fn attribute(&self, key: &str) -> Option<&String> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .and_then(|a| a.value.as_ref())
    }

    fn build_codec_map(&self) -> HashMap<u8, Codec> {
        let mut codecs: HashMap<u8, Codec> = HashMap::new();

        for m in &self.media_descriptions {
            for a in &m.attributes {
                let attr = a.to_string();
                if attr.starts_with("rtpmap:") {
                    if let Ok(codec) = parse_rtpmap(&attr) {
                        merge_codecs(codec, &mut codecs);
                    }
                } else if attr.starts_with("fmtp:") {
                    if let Ok(codec) = parse_fmtp(&attr) {
                        merge_codecs(codec, &mut codecs);
                    }
                } else if attr.starts_with("rtcp-fb:") {
                    if let Ok(codec) = parse_rtcp_fb(&attr) {
                        merge_codecs(codec, &mut codecs);
                    }
                }
            }
        }

        codecs
    }

    /// Looks up the codec registered for `payload_type` across all
    /// media sections.
    pub fn get_codec_for_payload_type(&self, payload_type: u8) -> Result<Codec> {
        self.build_codec_map()
            .remove(&payload_type)
            .ok_or(Error::PayloadTypeNotFound)
    }

    /// Finds the payload type whose codec matches `wanted` as closely
    /// as possible.
    pub fn get_payload_type_for_codec(&self, wanted: &Codec) -> Result<u8> {
        for (payload_type, codec) in self.build_codec_map().iter() {
            if codecs_match(wanted, codec) {
                return Ok(*payload_type);
            }
        }

        Err(Error::CodecNotFound)
    }
}
