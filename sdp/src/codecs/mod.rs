
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// ConnectionRole indicates which endpoint should initiate the
/// transport connection, carried in the `a=setup:` attribute.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionRole {
    #[default]
    Unspecified,

    /// The endpoint will initiate an outgoing connection.
    Active,

    /// The endpoint will accept an incoming connection.
    Passive,

    /// The endpoint is willing to do either.
    Actpass,

    /// The endpoint does not want the connection established yet.
    Holdconn,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionRole::Active => "active",
            ConnectionRole::Passive => "passive",
            ConnectionRole::Actpass => "actpass",
            ConnectionRole::Holdconn => "holdconn",
            ConnectionRole::Unspecified => "unspecified",
        };
        write!(f, "{s}")
    }
}

impl From<&str> for ConnectionRole {
    fn from(raw: &str) -> Self {
        match raw {
            "active" => ConnectionRole::Active,
            "passive" => ConnectionRole::Passive,
            "actpass" => ConnectionRole::Actpass,
            "holdconn" => ConnectionRole::Holdconn,
            _ => ConnectionRole::Unspecified,
        }
    }
}

/// JSEP wants a session id built as a 64-bit quantity with the top bit
/// zero and the rest cryptographically random.
pub(crate) fn new_session_id() -> u64 {
    rand::random::<u64>() & !(1u64 << 63)
}

/// One payload type's worth of codec information, accumulated from
/// `rtpmap`, `fmtp`, and `rtcp-fb` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codec {
    pub payload_type: u8,
    pub name: String,
    pub clock_rate: u32,
    pub encoding_parameters: String,
    pub fmtp: String,
    pub rtcp_feedback: Vec<String>,
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}/{} ({}) [{}]",
            self.payload_type,
            self.name,
            self.clock_rate,
            self.encoding_parameters,
            self.fmtp,
            self.rtcp_feedback.join(", "),
        )
    }
}

// a=rtpmap:<payload type> <encoding name>/<clock rate>[/<encoding parameters>]
pub(crate) fn parse_rtpmap(rtpmap: &str) -> Result<Codec> {
    let split: Vec<&str> = rtpmap.split_whitespace().collect();
    if split.len() != 2 {
        return Err(Error::MissingWhitespace);
    }

    let pt_split: Vec<&str> = split[0].split(':').collect();
    if pt_split.len() != 2 {
        return Err(Error::MissingColon);
    }
    let payload_type = pt_split[1].parse::<u8>()?;

    let split: Vec<&str> = split[1].split('/').collect();
    let name = split[0].to_owned();
    let clock_rate = if split.len() > 1 {
        split[1].parse::<u32>()?
    } else {
        0
    };
    let encoding_parameters = if split.len() > 2 {
        split[2].to_owned()
    } else {
        String::new()
    };

    Ok(Codec {
        payload_type,
        name,
        clock_rate,
        encoding_parameters,
        ..Codec::default()
    })
}

// a=fmtp:<format> <format specific parameters>
pub(crate) fn parse_fmtp(fmtp: &str) -> Result<Codec> {
    let split: Vec<&str> = fmtp.split_whitespace().collect();
    if split.len() != 2 {
        return Err(Error::MissingWhitespace);
    }

    let params = split[1].to_owned();

    let split: Vec<&str> = split[0].split(':').collect();
    if split.len() != 2 {
        return Err(Error::MissingColon);
    }
    let payload_type = split[1].parse::<u8>()?;

    Ok(Codec {
        payload_type,
        fmtp: params,
        ..Codec::default()
    })
}

// a=rtcp-fb:<payload type> <RTCP feedback type> [<RTCP feedback parameter>]
pub(crate) fn parse_rtcp_fb(rtcp_fb: &str) -> Result<Codec> {
    let split: Vec<&str> = rtcp_fb.splitn(2, ' ').collect();
    if split.len() != 2 {
        return Err(Error::MissingWhitespace);
    }

    let pt_split: Vec<&str> = split[0].split(':').collect();
    if pt_split.len() != 2 {
        return Err(Error::MissingColon);
    }

    Ok(Codec {
        payload_type: pt_split[1].parse::<u8>()?,
        rtcp_feedback: vec![split[1].to_owned()],
        ..Codec::default()
    })
}

pub(crate) fn merge_codecs(mut codec: Codec, codecs: &mut HashMap<u8, Codec>) {
    if let Some(saved) = codecs.get_mut(&codec.payload_type) {
        if saved.payload_type == 0 {
            saved.payload_type = codec.payload_type;
        }
        if saved.name.is_empty() {
            saved.name = codec.name;
        }
        if saved.clock_rate == 0 {
            saved.clock_rate = codec.clock_rate;
        }
        if saved.encoding_parameters.is_empty() {
            saved.encoding_parameters = codec.encoding_parameters;
        }
        if saved.fmtp.is_empty() {
            saved.fmtp = codec.fmtp;
        }
        saved.rtcp_feedback.append(&mut codec.rtcp_feedback);
    } else {
        codecs.insert(codec.payload_type, codec);
    }
}

fn equivalent_fmtp(want: &str, got: &str) -> bool {
    let mut want_split: Vec<&str> = want.split(';').map(str::trim).collect();
    let mut got_split: Vec<&str> = got.split(';').map(str::trim).collect();

    if want_split.len() != got_split.len() {
        return false;
    }

    want_split.sort_unstable();
    got_split.sort_unstable();

    want_split == got_split
}

pub(crate) fn codecs_match(wanted: &Codec, got: &Codec) -> bool {
    if !wanted.name.is_empty() && !wanted.name.eq_ignore_ascii_case(&got.name) {
        return false;
    }
    if wanted.clock_rate != 0 && wanted.clock_rate != got.clock_rate {
        return false;
    }
    if !wanted.encoding_parameters.is_empty()
        && wanted.encoding_parameters != got.encoding_parameters
    {
        return false;
    }
    if !wanted.fmtp.is_empty() && !equivalent_fmtp(&wanted.fmtp, &got.fmtp) {
        return false;
    }

    true
}
