#[cfg(test)]
mod media_test;

use std::fmt;

use crate::common::*;

/// MediaDescription represents one `m=` section and the lines that
/// belong to it.
///
/// <https://tools.ietf.org/html/rfc4566#section-5.14>
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    /// `m=<media> <port>/<number of ports> <proto> <fmt> ...`
    pub media_name: MediaName,

    /// `i=<media title>`
    pub media_title: Option<Information>,

    /// `c=<nettype> <addrtype> <connection-address>`
    pub connection_information: Option<ConnectionInformation>,

    /// `b=<bwtype>:<bandwidth>`
    pub bandwidth: Vec<Bandwidth>,

    /// `k=<method>` / `k=<method>:<encryption key>`
    pub encryption_key: Option<EncryptionKey>,

    /// `a=` lines; the primary means for extending SDP.
    pub attributes: Vec<Attribute>,
}

// The emission order of a media section is fixed by the grammar:
// m= i? c? b* k? a*
impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key_value(f, "m=", Some(&self.media_name))?;
        write_key_value(f, "i=", self.media_title.as_ref())?;
        write_key_value(f, "c=", self.connection_information.as_ref())?;
        for bandwidth in &self.bandwidth {
            write_key_value(f, "b=", Some(bandwidth))?;
        }
        write_key_value(f, "k=", self.encryption_key.as_ref())?;
        for attribute in &self.attributes {
            write_key_value(f, "a=", Some(attribute))?;
        }
        Ok(())
    }
}

impl MediaDescription {
    /// Returns whether an attribute exists.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key == key)
    }

    /// Returns the value of an attribute if it exists; property
    /// attributes yield `Some(None)`.
    pub fn attribute(&self, key: &str) -> Option<Option<&str>> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_deref())
    }

    /// Creates a media section with the defaults JSEP requires: a
    /// discard port and the DTLS/SRTP protocol stack.
    pub fn new_jsep_media_description(media: String) -> Self {
        MediaDescription {
            media_name: MediaName {
                media,
                port: RangedPort {
                    value: 9,
                    range: None,
                },
                protos: vec![
                    "UDP".to_owned(),
                    "TLS".to_owned(),
                    "RTP".to_owned(),
                    "SAVPF".to_owned(),
                ],
                formats: vec![],
            },
            connection_information: Some(ConnectionInformation {
                network_type: "IN".to_owned(),
                address_type: "IP4".to_owned(),
                address: Some(Address {
                    address: "0.0.0.0".to_owned(),
                    ttl: None,
                    range: None,
                }),
            }),
            ..MediaDescription::default()
        }
    }

    /// Adds a property attribute `a=key`.
    pub fn with_property_attribute(mut self, key: String) -> Self {
        self.attributes.push(Attribute::new(key, None));
        self
    }

    /// Adds a value attribute `a=key:value`.
    pub fn with_value_attribute(mut self, key: String, value: String) -> Self {
        self.attributes.push(Attribute::new(key, Some(value)));
        self
    }

    /// Adds a certificate fingerprint.
    pub fn with_fingerprint(self, algorithm: String, value: String) -> Self {
        self.with_value_attribute("fingerprint".to_owned(), algorithm + " " + &value)
    }

    /// Adds the ice-ufrag/ice-pwd credential pair.
    pub fn with_ice_credentials(self, username: String, password: String) -> Self {
        self.with_value_attribute("ice-ufrag".to_owned(), username)
            .with_value_attribute("ice-pwd".to_owned(), password)
    }

    /// Registers a payload type with its rtpmap (and fmtp when one is
    /// given).
    pub fn with_codec(
        mut self,
        payload_type: u8,
        name: String,
        clock_rate: u32,
        channels: u16,
        fmtp: String,
    ) -> Self {
        self.media_name.formats.push(payload_type.to_string());
        let rtpmap = if channels > 0 {
            format!("{payload_type} {name}/{clock_rate}/{channels}")
        } else {
            format!("{payload_type} {name}/{clock_rate}")
        };

        if fmtp.is_empty() {
            self.with_value_attribute("rtpmap".to_owned(), rtpmap)
        } else {
            self.with_value_attribute("rtpmap".to_owned(), rtpmap)
                .with_value_attribute("fmtp".to_owned(), format!("{payload_type} {fmtp}"))
        }
    }

    /// Adds the ssrc source-identifier lines for one media source.
    /// Several of these are deprecated but still emitted for
    /// interoperability.
    pub fn with_media_source(
        self,
        ssrc: u32,
        cname: String,
        stream_label: String,
        label: String,
    ) -> Self {
        self.with_value_attribute("ssrc".to_owned(), format!("{ssrc} cname:{cname}"))
            .with_value_attribute(
                "ssrc".to_owned(),
                format!("{ssrc} msid:{stream_label} {label}"),
            )
            .with_value_attribute("ssrc".to_owned(), format!("{ssrc} mslabel:{stream_label}"))
            .with_value_attribute("ssrc".to_owned(), format!("{ssrc} label:{label}"))
    }

    /// Adds an ICE candidate attribute.
    pub fn with_candidate(self, value: String) -> Self {
        self.with_value_attribute("candidate".to_owned(), value)
    }
}

/// RangedPort is the "m=" port token, optionally `<port>/<number of
/// ports>` for multi-port media.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangedPort {
    pub value: isize,
    pub range: Option<isize>,
}

impl fmt::Display for RangedPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some(range) => write!(f, "{}/{}", self.value, range),
            None => write!(f, "{}", self.value),
        }
    }
}

/// MediaName describes the "m=" field storage structure.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MediaName {
    pub media: String,
    pub port: RangedPort,
    pub protos: Vec<String>,
    pub formats: Vec<String>,
}

impl fmt::Display for MediaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.media, self.port, self.protos.join("/"))?;
        for format in &self.formats {
            write!(f, " {format}")?;
        }
        Ok(())
    }
}
