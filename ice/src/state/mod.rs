
use std::fmt;

/// The overall connectivity state of the agent. `Closed` is absorbing:
/// no transition ever leaves it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// The agent is gathering or waiting for remote credentials.
    #[default]
    New,

    /// The agent is probing candidate pairs.
    Checking,

    /// A working pair has been selected.
    Connected,

    /// Checks have finished and a pair is selected.
    Completed,

    /// The selected pair stopped receiving; checks continue.
    Disconnected,

    /// All checks failed.
    Failed,

    /// The agent was shut down.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::New => "New",
            ConnectionState::Checking => "Checking",
            ConnectionState::Connected => "Connected",
            ConnectionState::Completed => "Completed",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Failed => "Failed",
            ConnectionState::Closed => "Closed",
        };
        write!(f, "{s}")
    }
}

/// The state of local candidate gathering. Without trickle support the
/// lifecycle is simply New -> Complete at construction time.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum GatheringState {
    #[default]
    New,
    Gathering,
    Complete,
    Closed,
}

impl fmt::Display for GatheringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GatheringState::New => "new",
            GatheringState::Gathering => "gathering",
            GatheringState::Complete => "complete",
            GatheringState::Closed => "closed",
        };
        write!(f, "{s}")
    }
}
