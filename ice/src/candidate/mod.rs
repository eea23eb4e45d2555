
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crc::{Crc, CRC_32_ISCSI};
use tokio::net::UdpSocket;

use crate::error::{Error, Result};
use crate::network_type::{create_addr, determine_network_type, NetworkType};
use crate::rand::generate_cand_id;

/// Indicates that the candidate is used for RTP.
pub const COMPONENT_RTP: u16 = 1;
/// Indicates that the candidate is used for RTCP.
pub const COMPONENT_RTCP: u16 = 2;

pub(crate) const RECEIVE_MTU: usize = 8192;

/// The four candidate kinds of RFC 8445, ordered by their recommended
/// type preference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CandidateType {
    Host,
    ServerReflexive,
    PeerReflexive,
    Relay,
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CandidateType::Host => "host",
            CandidateType::ServerReflexive => "srflx",
            CandidateType::PeerReflexive => "prflx",
            CandidateType::Relay => "relay",
        };
        write!(f, "{s}")
    }
}

impl CandidateType {
    /// The RECOMMENDED type preference values of RFC 8445 4.1.2.2.
    #[must_use]
    pub const fn preference(self) -> u16 {
        match self {
            CandidateType::Host => 126,
            CandidateType::PeerReflexive => 110,
            CandidateType::ServerReflexive => 100,
            CandidateType::Relay => 0,
        }
    }
}

/// The transport address a derived candidate was obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedAddress {
    pub address: String,
    pub port: u16,
}

impl fmt::Display for RelatedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " related {}:{}", self.address, self.port)
    }
}

/// The candidate kind together with its kind-specific fields. Host
/// candidates have no related address; the derived kinds carry the
/// base they were obtained from when it is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    Host,
    ServerReflexive { related: Option<RelatedAddress> },
    PeerReflexive { related: Option<RelatedAddress> },
    Relay { related: Option<RelatedAddress> },
}

impl CandidateKind {
    pub fn candidate_type(&self) -> CandidateType {
        match self {
            CandidateKind::Host => CandidateType::Host,
            CandidateKind::ServerReflexive { .. } => CandidateType::ServerReflexive,
            CandidateKind::PeerReflexive { .. } => CandidateType::PeerReflexive,
            CandidateKind::Relay { .. } => CandidateType::Relay,
        }
    }

    pub fn related_address(&self) -> Option<&RelatedAddress> {
        match self {
            CandidateKind::Host => None,
            CandidateKind::ServerReflexive { related }
            | CandidateKind::PeerReflexive { related }
            | CandidateKind::Relay { related } => related.as_ref(),
        }
    }
}

/// One transport address a peer can be reached on. A host candidate
/// exclusively owns its bound socket; derived candidates share the
/// socket of the host candidate they came from.
pub struct Candidate {
    pub(crate) id: String,
    pub(crate) kind: CandidateKind,
    pub(crate) network_type: NetworkType,
    pub(crate) address: String,
    pub(crate) port: u16,
    pub(crate) component: u16,
    pub(crate) local_preference: u16,
    pub(crate) priority_override: u32,
    pub(crate) foundation_override: String,
    pub(crate) resolved_addr: SocketAddr,
    pub(crate) conn: Option<Arc<UdpSocket>>,

    // Unix nanos of the last outbound/inbound traffic on this
    // candidate.
    pub(crate) last_sent: AtomicU64,
    pub(crate) last_received: AtomicU64,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}:{}",
            self.network_type,
            self.candidate_type(),
            self.address,
            self.port,
        )?;
        if let Some(related) = self.kind.related_address() {
            write!(f, "{related}")?;
        }
        Ok(())
    }
}

impl PartialEq for Candidate {
    /// Candidate identity for pair bookkeeping: same kind and same
    /// transport endpoint.
    fn eq(&self, other: &Self) -> bool {
        self.network_type == other.network_type
            && self.kind.candidate_type() == other.kind.candidate_type()
            && self.address == other.address
            && self.port == other.port
            && self.kind.related_address() == other.kind.related_address()
    }
}

impl Candidate {
    pub fn id(&self) -> String {
        self.id.clone()
    }

    pub fn candidate_type(&self) -> CandidateType {
        self.kind.candidate_type()
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn address(&self) -> String {
        self.address.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn component(&self) -> u16 {
        self.component
    }

    pub fn related_address(&self) -> Option<RelatedAddress> {
        self.kind.related_address().cloned()
    }

    pub fn addr(&self) -> SocketAddr {
        self.resolved_addr
    }

    /// An opaque token grouping candidates derived from the same base:
    /// equal for two candidates of the same type, address, and
    /// transport.
    pub fn foundation(&self) -> String {
        if !self.foundation_override.is_empty() {
            return self.foundation_override.clone();
        }

        let mut buf = vec![];
        buf.extend_from_slice(self.candidate_type().to_string().as_bytes());
        buf.extend_from_slice(self.address.as_bytes());
        buf.extend_from_slice(self.network_type.to_string().as_bytes());

        Crc::<u32>::new(&CRC_32_ISCSI).checksum(&buf).to_string()
    }

    /// Computes the candidate priority:
    /// `(2^24)*type preference + (2^8)*local preference +
    /// (2^0)*(256 - component)`.
    pub fn priority(&self) -> u32 {
        if self.priority_override != 0 {
            return self.priority_override;
        }

        (1 << 24) * u32::from(self.candidate_type().preference())
            + (1 << 8) * u32::from(self.local_preference)
            + (256 - u32::from(self.component))
    }

    /// The candidate-attribute value this candidate signals as.
    pub fn marshal(&self) -> String {
        let mut out = format!(
            "{} {} {} {} {} {} typ {}",
            self.foundation(),
            self.component,
            self.network_type.network_short(),
            self.priority(),
            self.address,
            self.port,
            self.candidate_type()
        );

        if let Some(related) = self.kind.related_address() {
            out += &format!(" raddr {} rport {}", related.address, related.port);
        }

        out += " generation 0";
        out
    }

    pub(crate) fn seen(&self, outbound: bool) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos() as u64;

        if outbound {
            self.last_sent.store(now, Ordering::SeqCst);
        } else {
            self.last_received.store(now, Ordering::SeqCst);
        }
    }

    pub fn last_sent(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.last_sent.load(Ordering::SeqCst))
    }

    pub fn last_received(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.last_received.load(Ordering::SeqCst))
    }

    /// Sends `raw` from this candidate's socket to `dst`.
    pub(crate) async fn write_to(&self, raw: &[u8], dst: &Candidate) -> Result<usize> {
        let Some(conn) = &self.conn else {
            return Err(Error::ErrClosed);
        };
        let n = conn.send_to(raw, dst.addr()).await?;
        self.seen(true);
        Ok(n)
    }
}

/// The shared inputs for constructing a candidate of any kind.
#[derive(Default)]
pub struct CandidateConfig {
    pub candidate_id: String,
    pub network: String,
    pub address: String,
    pub port: u16,
    pub component: u16,
    /// Zero means "compute from kind and local preference".
    pub priority: u32,
    /// Empty means "compute from kind, address, and transport".
    pub foundation: String,
    pub related_address: Option<RelatedAddress>,
    pub conn: Option<Arc<UdpSocket>>,
}

impl CandidateConfig {
    pub fn new_host(self) -> Result<Candidate> {
        self.build(CandidateKind::Host)
    }

    pub fn new_server_reflexive(mut self) -> Result<Candidate> {
        let related = self.related_address.take();
        self.build(CandidateKind::ServerReflexive { related })
    }

    pub fn new_peer_reflexive(mut self) -> Result<Candidate> {
        let related = self.related_address.take();
        self.build(CandidateKind::PeerReflexive { related })
    }

    pub fn new_relay(mut self) -> Result<Candidate> {
        let related = self.related_address.take();
        self.build(CandidateKind::Relay { related })
    }

    fn build(self, kind: CandidateKind) -> Result<Candidate> {
        let ip = self
            .address
            .parse()
            .map_err(|_| Error::ErrAddressParseFailed)?;
        let network = if self.network.is_empty() {
            "udp"
        } else {
            self.network.as_str()
        };
        let network_type = determine_network_type(network, &ip)?;

        let id = if self.candidate_id.is_empty() {
            generate_cand_id()
        } else {
            self.candidate_id
        };

        Ok(Candidate {
            id,
            kind,
            network_type,
            resolved_addr: create_addr(ip, self.port),
            address: self.address,
            port: self.port,
            component: if self.component == 0 {
                COMPONENT_RTP
            } else {
                self.component
            },
            // The local preference is a fresh random 16-bit value per
            // candidate so otherwise identical candidates still order
            // deterministically.
            local_preference: rand::random::<u16>(),
            priority_override: self.priority,
            foundation_override: self.foundation,
            conn: self.conn,
            last_sent: AtomicU64::new(0),
            last_received: AtomicU64::new(0),
        })
    }
}

/// Creates a candidate from its candidate-attribute representation:
/// `<foundation> <component> <transport> <priority> <address> <port>
/// typ <type> [raddr <addr> rport <port>] ...`. Unknown trailing
/// extensions such as `generation` are skipped.
pub fn unmarshal_candidate(raw: &str) -> Result<Candidate> {
    let split: Vec<&str> = raw.split_whitespace().collect();
    if split.len() < 8 {
        return Err(Error::ErrAttributeTooShortIceCandidate);
    }

    let foundation = split[0].to_owned();
    let component: u16 = split[1].parse().map_err(|_| Error::ErrParseComponent)?;
    let network = split[2].to_owned();
    let priority: u32 = split[3].parse().map_err(|_| Error::ErrParsePriority)?;
    let address = split[4].to_owned();
    let port: u16 = split[5].parse().map_err(|_| Error::ErrParsePort)?;

    if split[6] != "typ" {
        return Err(Error::ErrParseType);
    }
    let typ = split[7];

    let mut related_address = None;
    if split.len() > 8 && split[8] == "raddr" {
        if split.len() < 12 || split[10] != "rport" {
            return Err(Error::ErrParseRelatedAddr);
        }
        related_address = Some(RelatedAddress {
            address: split[9].to_owned(),
            port: split[11].parse().map_err(|_| Error::ErrParsePort)?,
        });
    }

    let config = CandidateConfig {
        network,
        address,
        port,
        component,
        priority,
        foundation,
        related_address,
        ..CandidateConfig::default()
    };

    match typ {
        "host" => config.new_host(),
        "srflx" => config.new_server_reflexive(),
        "prflx" => config.new_peer_reflexive(),
        "relay" => config.new_relay(),
        _ => Err(Error::ErrUnknownCandidateType),
    }
}

/// A local/remote candidate tuple that has been or may be probed.
#[derive(Clone)]
pub struct CandidatePair {
    pub local: Arc<Candidate>,
    pub remote: Arc<Candidate>,
    pub(crate) controlling: bool,
}

impl fmt::Debug for CandidatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prio {} (local, prio {}) {} <-> {} (remote, prio {})",
            self.priority(),
            self.local.priority(),
            self.local,
            self.remote,
            self.remote.priority()
        )
    }
}

impl fmt::Display for CandidatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.local, self.remote)
    }
}

// Pair identity is the (local, remote) endpoint identity.
impl PartialEq for CandidatePair {
    fn eq(&self, other: &Self) -> bool {
        self.local.as_ref() == other.local.as_ref()
            && self.remote.as_ref() == other.remote.as_ref()
    }
}

impl CandidatePair {
    #[must_use]
    pub fn new(local: Arc<Candidate>, remote: Arc<Candidate>, controlling: bool) -> Self {
        CandidatePair {
            local,
            remote,
            controlling,
        }
    }

    /// RFC 8445 6.1.2.3: with G the controlling side's candidate
    /// priority and D the controlled side's,
    /// `pair priority = 2^32*MIN(G,D) + 2*MAX(G,D) + (G>D?1:0)`.
    pub fn priority(&self) -> u64 {
        let (g, d) = if self.controlling {
            (self.local.priority(), self.remote.priority())
        } else {
            (self.remote.priority(), self.local.priority())
        };

        // 1<<32 would overflow when both priorities max out, so the
        // min term is scaled by 2^32-1.
        ((1u64 << 32) - 1) * u64::from(g.min(d))
            + 2 * u64::from(g.max(d))
            + u64::from(g > d)
    }

    pub(crate) async fn write(&self, b: &[u8]) -> Result<usize> {
        self.local.write_to(b, &self.remote).await
    }
}
