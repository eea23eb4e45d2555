use std::net::IpAddr;

use tokio::time::Duration;

use crate::candidate::CandidateType;
use crate::network_type::{supported_network_types, NetworkType};
use crate::url::Url;

/// Filters the interface addresses host candidates are gathered on.
pub type IpFilterFn = Box<dyn Fn(IpAddr) -> bool + Send + Sync>;

/// How often the task loop contacts candidates while checking.
pub(crate) const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// How long a selected pair may be send-silent before a keepalive goes
/// out.
pub(crate) const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// How long a selected pair may be receive-silent before the agent
/// demotes itself to disconnected.
pub(crate) const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// How long an outbound binding request stays valid for response
/// matching.
pub(crate) const MAX_BINDING_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// Upper bound for buffered inbound payload bytes awaiting `recv`.
pub(crate) const MAX_BUFFER_SIZE: usize = 1000 * 1000;

/// Collects the options for constructing an [`crate::agent::Agent`].
#[derive(Default)]
pub struct AgentConfig {
    /// STUN servers used to derive server-reflexive candidates. TURN
    /// URLs are accepted but currently unused.
    pub urls: Vec<Url>,

    /// Limit the port range of gathered host candidates; zero for both
    /// means any ephemeral port.
    pub port_min: u16,
    pub port_max: u16,

    /// `None` selects the 30 second default; an explicit zero disables
    /// the timeout entirely.
    pub connection_timeout: Option<Duration>,

    /// `None` selects the 10 second default; an explicit zero disables
    /// keepalives.
    pub keepalive_interval: Option<Duration>,

    /// `None` selects the 2 second default tick.
    pub check_interval: Option<Duration>,

    /// The candidate kinds this agent gathers; empty means host plus
    /// server-reflexive.
    pub candidate_types: Vec<CandidateType>,

    /// The transport families to gather on; empty means UDP over IPv4.
    pub network_types: Vec<NetworkType>,

    /// Gather host candidates on loopback interfaces too. Off by
    /// default; tests rely on it.
    pub include_loopback: bool,

    /// Keep only the interface addresses this predicate accepts.
    pub ip_filter: Option<IpFilterFn>,
}

impl AgentConfig {
    pub(crate) fn connection_timeout(&self) -> Duration {
        self.connection_timeout
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT)
    }

    pub(crate) fn keepalive_interval(&self) -> Duration {
        self.keepalive_interval
            .unwrap_or(DEFAULT_KEEPALIVE_INTERVAL)
    }

    pub(crate) fn check_interval(&self) -> Duration {
        self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL)
    }

    pub(crate) fn candidate_types(&self) -> Vec<CandidateType> {
        if self.candidate_types.is_empty() {
            vec![CandidateType::Host, CandidateType::ServerReflexive]
        } else {
            self.candidate_types.clone()
        }
    }

    pub(crate) fn network_types(&self) -> Vec<NetworkType> {
        if self.network_types.is_empty() {
            supported_network_types()
        } else {
            self.network_types.clone()
        }
    }
}
