
use url::Url;

use crate::common::*;
use crate::error::{Error, Result};
use crate::media::{MediaDescription, MediaName, RangedPort};
use crate::session::{
    Origin, RepeatTime, SessionDescription, TimeDescription, TimeZone, Timing,
};

/// The states of the RFC 4566 line grammar
/// `v o s i? u? e? p? c? b* (t r*)+ z? k? a* (m i? c? b* k? a*)*`,
/// derived from the regular expression the same way the JSEP draft
/// does. A `.` marks the states in which end-of-input is accepted.
///
/// ```ignore
/// +--------+----+-------+----+-----+----+-----+---+----+----+---+---+-----+---+---+----+---+----+
/// | STATES | a* | a*,k* | a  | a,k | b  | b,c | e | i  | m  | o | p | r,t | s | t | u  | v | z  |
/// +--------+----+-------+----+-----+----+-----+---+----+----+---+---+-----+---+---+----+---+----+
/// |   s1   |    |       |    |     |    |     |   |    |    |   |   |     |   |   |    | 2 |    |
/// |   s2   |    |       |    |     |    |     |   |    |    | 3 |   |     |   |   |    |   |    |
/// |   s3   |    |       |    |     |    |     |   |    |    |   |   |     | 4 |   |    |   |    |
/// |   s4   |    |       |    |     |    |   5 | 6 |  7 |    |   | 8 |     |   | 9 | 10 |   |    |
/// |   s5   |    |       |    |     |  5 |     |   |    |    |   |   |     |   | 9 |    |   |    |
/// |   s6   |    |       |    |     |    |   5 |   |    |    |   | 8 |     |   | 9 |    |   |    |
/// |   s7   |    |       |    |     |    |   5 | 6 |    |    |   | 8 |     |   | 9 | 10 |   |    |
/// |   s8   |    |       |    |     |    |   5 |   |    |    |   |   |     |   | 9 |    |   |    |
/// |   s9.  |    |       |    |  11 |    |     |   |    | 12 |   |   |   9 |   |   |    |   | 13 |
/// |   s10  |    |       |    |     |    |   5 | 6 |    |    |   | 8 |     |   | 9 |    |   |    |
/// |   s11. |    |       | 11 |     |    |     |   |    | 12 |   |   |     |   |   |    |   |    |
/// |   s12. |    |    14 |    |     |    |  15 |   | 16 | 12 |   |   |     |   |   |    |   |    |
/// |   s13. |    |       |    |  11 |    |     |   |    | 12 |   |   |     |   |   |    |   |    |
/// |   s14. | 14 |       |    |     |    |     |   |    | 12 |   |   |     |   |   |    |   |    |
/// |   s15. |    |    14 |    |     | 15 |     |   |    | 12 |   |   |     |   |   |    |   |    |
/// |   s16. |    |    14 |    |     |    |  15 |   |    | 12 |   |   |     |   |   |    |   |    |
/// +--------+----+-------+----+-----+----+-----+---+----+----+---+---+-----+---+---+----+---+----+
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
    S10,
    S11,
    S12,
    S13,
    S14,
    S15,
    S16,
}

impl State {
    fn accepts_end(self) -> bool {
        matches!(
            self,
            State::S9
                | State::S11
                | State::S12
                | State::S13
                | State::S14
                | State::S15
                | State::S16
        )
    }
}

/// Yields `(key, value)` per non-empty line, accepting both `\n` and
/// `\r\n` endings. A line that is not of the form `x=value` is a
/// syntax error.
struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Lines { rest: input }
    }

    fn next(&mut self) -> Result<Option<(u8, &'a str)>> {
        loop {
            if self.rest.is_empty() {
                return Ok(None);
            }

            let (line, rest) = match self.rest.find('\n') {
                Some(idx) => (&self.rest[..idx], &self.rest[idx + 1..]),
                None => (self.rest, ""),
            };
            self.rest = rest;

            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            if line.len() < 2 || line.as_bytes()[1] != b'=' || !line.is_char_boundary(2) {
                return Err(Error::SdpInvalidSyntax(line.to_owned()));
            }

            return Ok(Some((line.as_bytes()[0], &line[2..])));
        }
    }
}

pub(crate) fn parse(input: &str) -> Result<SessionDescription> {
    let mut desc = SessionDescription::default();
    let mut lines = Lines::new(input);
    let mut state = State::S1;

    loop {
        let Some((key, value)) = lines.next()? else {
            if state.accepts_end() {
                return Ok(desc);
            }
            return Err(Error::SdpInvalidSyntax(String::new()));
        };

        state = match (state, key) {
            (State::S1, b'v') => parse_version(&mut desc, value)?,
            (State::S2, b'o') => parse_origin(&mut desc, value)?,
            (State::S3, b's') => parse_session_name(&mut desc, value)?,

            (State::S4, b'i') => parse_session_information(&mut desc, value)?,
            (State::S4 | State::S7, b'u') => parse_uri(&mut desc, value)?,
            (State::S4 | State::S7 | State::S10, b'e') => parse_email(&mut desc, value)?,
            (State::S4 | State::S6 | State::S7 | State::S10, b'p') => {
                parse_phone(&mut desc, value)?
            }
            (
                State::S4 | State::S6 | State::S7 | State::S8 | State::S10,
                b'c',
            ) => parse_session_connection(&mut desc, value)?,
            (
                State::S4 | State::S5 | State::S6 | State::S7 | State::S8 | State::S10,
                b'b',
            ) => parse_session_bandwidth(&mut desc, value)?,
            (
                State::S4
                | State::S5
                | State::S6
                | State::S7
                | State::S8
                | State::S9
                | State::S10,
                b't',
            ) => parse_timing(&mut desc, value)?,

            (State::S9, b'r') => parse_repeat_times(&mut desc, value)?,
            (State::S9, b'z') => parse_time_zones(&mut desc, value)?,
            (State::S9 | State::S13, b'k') => parse_session_encryption_key(&mut desc, value)?,
            (State::S9 | State::S11 | State::S13, b'a') => {
                parse_session_attribute(&mut desc, value)?
            }
            (
                State::S9
                | State::S11
                | State::S12
                | State::S13
                | State::S14
                | State::S15
                | State::S16,
                b'm',
            ) => parse_media_description(&mut desc, value)?,

            (State::S12 | State::S14 | State::S15 | State::S16, b'a') => {
                parse_media_attribute(&mut desc, value)?
            }
            (State::S12 | State::S14 | State::S15 | State::S16, b'k') => {
                parse_media_encryption_key(&mut desc, value)?
            }
            (State::S12 | State::S14 | State::S15 | State::S16, b'b') => {
                parse_media_bandwidth(&mut desc, value)?
            }
            (State::S12 | State::S14 | State::S15 | State::S16, b'c') => {
                parse_media_connection(&mut desc, value)?
            }
            (State::S12 | State::S14 | State::S15 | State::S16, b'i') => {
                parse_media_title(&mut desc, value)?
            }

            _ => {
                return Err(Error::SdpInvalidSyntax(format!(
                    "`{}={value}`",
                    key as char
                )))
            }
        };
    }
}

fn parse_version(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let version = value.parse::<u32>()?;

    // JSEP requires the version to be 0.
    if version != 0 {
        return Err(Error::SdpInvalidSyntax(value.to_owned()));
    }
    desc.version = version as isize;

    Ok(State::S2)
}

fn parse_origin(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(Error::SdpInvalidSyntax(format!("`o={value}`")));
    }

    let session_id = fields[1].parse::<u64>()?;
    let session_version = fields[2].parse::<u64>()?;

    // The nettype and addrtype sets registered with IANA.
    if fields[3] != "IN" {
        return Err(Error::SdpInvalidValue(fields[3].to_owned()));
    }
    if !matches!(fields[4], "IP4" | "IP6") {
        return Err(Error::SdpInvalidValue(fields[4].to_owned()));
    }

    desc.origin = Origin {
        username: fields[0].to_owned(),
        session_id,
        session_version,
        network_type: fields[3].to_owned(),
        address_type: fields[4].to_owned(),
        unicast_address: fields[5].to_owned(),
    };

    Ok(State::S3)
}

fn parse_session_name(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.session_name = value.to_owned();
    Ok(State::S4)
}

fn parse_session_information(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.session_information = Some(value.to_owned());
    Ok(State::S7)
}

fn parse_uri(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.uri = Some(Url::parse(value)?);
    Ok(State::S10)
}

fn parse_email(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.email_address = Some(value.to_owned());
    Ok(State::S6)
}

fn parse_phone(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.phone_number = Some(value.to_owned());
    Ok(State::S8)
}

fn parse_session_connection(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.connection_information = Some(parse_connection_information(value)?);
    Ok(State::S5)
}

fn parse_connection_information(value: &str) -> Result<ConnectionInformation> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(Error::SdpInvalidSyntax(format!("`c={value}`")));
    }

    if fields[0] != "IN" {
        return Err(Error::SdpInvalidValue(fields[0].to_owned()));
    }
    if !matches!(fields[1], "IP4" | "IP6") {
        return Err(Error::SdpInvalidValue(fields[1].to_owned()));
    }

    let address = if fields.len() > 2 {
        Some(parse_address(fields[1], fields[2])?)
    } else {
        None
    };

    Ok(ConnectionInformation {
        network_type: fields[0].to_owned(),
        address_type: fields[1].to_owned(),
        address,
    })
}

// `<base multicast address>[/<ttl>]/<number of addresses>`; the ttl
// slot only exists for IPv4.
fn parse_address(address_type: &str, token: &str) -> Result<Address> {
    let mut parts = token.split('/');
    let address = parts
        .next()
        .ok_or_else(|| Error::SdpInvalidValue(token.to_owned()))?
        .to_owned();

    let mut ttl = None;
    let mut range = None;

    if let Some(first) = parts.next() {
        let first = first.parse::<isize>()?;
        if address_type == "IP6" {
            range = Some(first);
        } else {
            ttl = Some(first);
        }
    }
    if let Some(second) = parts.next() {
        if range.is_some() {
            return Err(Error::SdpInvalidValue(token.to_owned()));
        }
        range = Some(second.parse::<isize>()?);
    }
    if parts.next().is_some() {
        return Err(Error::SdpInvalidValue(token.to_owned()));
    }

    Ok(Address {
        address,
        ttl,
        range,
    })
}

fn parse_bandwidth(value: &str) -> Result<Bandwidth> {
    let mut parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 {
        return Err(Error::SdpInvalidSyntax(format!("`b={value}`")));
    }

    let experimental = parts[0].starts_with("X-");
    if experimental {
        parts[0] = parts[0].trim_start_matches("X-");
    } else if !matches!(parts[0], "CT" | "AS" | "TIAS") {
        // Registered with IANA per RFC 4566 section 5.8 and RFC 3890.
        return Err(Error::SdpInvalidValue(parts[0].to_owned()));
    }

    Ok(Bandwidth {
        experimental,
        bandwidth_type: parts[0].to_owned(),
        bandwidth: parts[1].parse::<u64>()?,
    })
}

fn parse_session_bandwidth(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.bandwidth.push(parse_bandwidth(value)?);
    Ok(State::S5)
}

fn parse_timing(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(Error::SdpInvalidSyntax(format!("`t={value}`")));
    }

    desc.time_descriptions.push(TimeDescription {
        timing: Timing {
            start_time: fields[0].parse::<u64>()?,
            stop_time: fields[1].parse::<u64>()?,
        },
        repeat_times: vec![],
    });

    Ok(State::S9)
}

fn parse_repeat_times(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(Error::SdpInvalidSyntax(format!("`r={value}`")));
    }

    let Some(time_description) = desc.time_descriptions.last_mut() else {
        return Err(Error::SdpEmptyTimeDescription);
    };

    let mut offsets = vec![];
    for field in &fields[2..] {
        offsets.push(parse_time_units(field)?);
    }
    time_description.repeat_times.push(RepeatTime {
        interval: parse_time_units(fields[0])?,
        duration: parse_time_units(fields[1])?,
        offsets,
    });

    Ok(State::S9)
}

fn parse_time_zones(desc: &mut SessionDescription, value: &str) -> Result<State> {
    // z= carries adjustment-time/offset pairs.
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() % 2 != 0 {
        return Err(Error::SdpInvalidSyntax(format!("`z={value}`")));
    }

    for pair in fields.chunks_exact(2) {
        desc.time_zones.push(TimeZone {
            adjustment_time: pair[0].parse::<u64>()?,
            offset: parse_time_units(pair[1])?,
        });
    }

    Ok(State::S13)
}

fn parse_session_encryption_key(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.encryption_key = Some(value.to_owned());
    Ok(State::S11)
}

fn parse_attribute(value: &str) -> Attribute {
    match value.split_once(':') {
        Some((key, value)) => Attribute::new(key.to_owned(), Some(value.to_owned())),
        None => Attribute::new(value.to_owned(), None),
    }
}

fn parse_session_attribute(desc: &mut SessionDescription, value: &str) -> Result<State> {
    desc.attributes.push(parse_attribute(value));
    Ok(State::S11)
}

fn parse_media_description(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(Error::SdpInvalidSyntax(format!("`m={value}`")));
    }

    // <media>, registered with IANA (plus "image" from RFC 6466).
    if !matches!(
        fields[0],
        "audio" | "video" | "text" | "application" | "message" | "image"
    ) {
        return Err(Error::SdpInvalidValue(fields[0].to_owned()));
    }

    // <port>[/<number of ports>]
    let parts: Vec<&str> = fields[1].split('/').collect();
    let port_value = parts[0].parse::<u16>()? as isize;
    let port_range = if parts.len() > 1 {
        Some(parts[1].parse::<i32>()? as isize)
    } else {
        None
    };

    // <proto>, each token from the registered set.
    let mut protos = vec![];
    for proto in fields[2].split('/') {
        if !matches!(
            proto,
            "UDP" | "RTP" | "AVP" | "SAVP" | "SAVPF" | "TLS" | "DTLS" | "SCTP" | "AVPF" | "udptl"
        ) {
            return Err(Error::SdpInvalidValue(fields[2].to_owned()));
        }
        protos.push(proto.to_owned());
    }

    desc.media_descriptions.push(MediaDescription {
        media_name: MediaName {
            media: fields[0].to_owned(),
            port: RangedPort {
                value: port_value,
                range: port_range,
            },
            protos,
            formats: fields[3..].iter().map(|s| (*s).to_owned()).collect(),
        },
        ..MediaDescription::default()
    });

    Ok(State::S12)
}

fn last_media<'a>(desc: &'a mut SessionDescription) -> Result<&'a mut MediaDescription> {
    desc.media_descriptions
        .last_mut()
        .ok_or(Error::SdpEmptyTimeDescription)
}

fn parse_media_title(desc: &mut SessionDescription, value: &str) -> Result<State> {
    last_media(desc)?.media_title = Some(value.to_owned());
    Ok(State::S16)
}

fn parse_media_connection(desc: &mut SessionDescription, value: &str) -> Result<State> {
    last_media(desc)?.connection_information = Some(parse_connection_information(value)?);
    Ok(State::S15)
}

fn parse_media_bandwidth(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let bandwidth = parse_bandwidth(value)?;
    last_media(desc)?.bandwidth.push(bandwidth);
    Ok(State::S15)
}

fn parse_media_encryption_key(desc: &mut SessionDescription, value: &str) -> Result<State> {
    last_media(desc)?.encryption_key = Some(value.to_owned());
    Ok(State::S14)
}

fn parse_media_attribute(desc: &mut SessionDescription, value: &str) -> Result<State> {
    let attribute = parse_attribute(value);
    last_media(desc)?.attributes.push(attribute);
    Ok(State::S14)
}

// Time offsets may use shorthand units; normalize to seconds.
fn parse_time_units(value: &str) -> Result<i64> {
    let (num, factor) = match value.as_bytes().last() {
        Some(b'd') => (&value[..value.len() - 1], 86400),
        Some(b'h') => (&value[..value.len() - 1], 3600),
        Some(b'm') => (&value[..value.len() - 1], 60),
        Some(b's') => (&value[..value.len() - 1], 1),
        _ => (value, 1),
    };
    num.parse::<i64>()?
        .checked_mul(factor)
        .ok_or_else(|| Error::SdpInvalidValue(value.to_owned()))
}
