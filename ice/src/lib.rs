#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod agent;
pub mod candidate;
mod error;
pub mod network_type;
pub mod rand;
pub mod state;
pub mod url;

pub use agent::{Agent, AgentConfig, AgentConn};
pub use candidate::{Candidate, CandidatePair, CandidateType};
pub use error::{Error, Result};
pub use state::{ConnectionState, GatheringState};
