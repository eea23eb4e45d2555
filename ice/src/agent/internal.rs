use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use stun::attributes::Attribute;
use stun::{Message, MessageClass, TransactionId, METHOD_BINDING};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, Instant};
use util::Buffer;

use super::config::{AgentConfig, MAX_BINDING_REQUEST_TIMEOUT};
use crate::candidate::{Candidate, CandidateConfig, CandidatePair};
use crate::error::{Error, Result};
use crate::network_type::NetworkType;
use crate::rand::{generate_pwd, generate_ufrag};
use crate::state::{ConnectionState, GatheringState};

/// Events pushed out of the task loop and consumed by the handler
/// dispatcher, keeping user callbacks off the loop.
pub(crate) enum AgentEvent {
    ConnectionStateChange(ConnectionState),
    SelectedCandidatePairChange(Arc<Candidate>, Arc<Candidate>),
}

/// Operations submitted to the task loop. Getters reply on a oneshot;
/// nothing outside the loop ever touches agent state directly.
pub(crate) enum Command {
    StartConnectivityChecks {
        controlling: bool,
        remote_ufrag: String,
        remote_pwd: String,
        resp: oneshot::Sender<Result<()>>,
    },
    AddRemoteCandidate {
        candidate: Arc<Candidate>,
        resp: oneshot::Sender<Result<()>>,
    },
    GetLocalCandidates {
        resp: oneshot::Sender<Vec<Arc<Candidate>>>,
    },
    GetLocalCredentials {
        resp: oneshot::Sender<(String, String)>,
    },
    GetSelectedPair {
        resp: oneshot::Sender<Option<CandidatePair>>,
    },
    Write {
        data: Vec<u8>,
        resp: oneshot::Sender<Result<usize>>,
    },
    Close {
        resp: oneshot::Sender<()>,
    },
}

/// Inbound traffic demultiplexed and pre-parsed by a socket reader
/// task.
pub(crate) enum Inbound {
    Stun {
        message: Message,
        local: Arc<Candidate>,
        from: SocketAddr,
    },
    Data {
        data: Vec<u8>,
        local: Arc<Candidate>,
        from: SocketAddr,
    },
}

/// An outbound binding request we may still see a response for.
#[derive(Debug, Clone)]
pub(crate) struct BindingRequest {
    pub(crate) timestamp: Instant,
    pub(crate) transaction_id: TransactionId,
    pub(crate) destination: SocketAddr,
    pub(crate) is_use_candidate: bool,
}

/// All mutable agent state. Owned exclusively by the task loop, which
/// is the single writer; everything else goes through [`Command`].
pub(crate) struct AgentInner {
    pub(crate) controlling: bool,
    pub(crate) tie_breaker: u64,

    pub(crate) local_ufrag: String,
    pub(crate) local_pwd: String,
    pub(crate) remote_ufrag: String,
    pub(crate) remote_pwd: String,

    pub(crate) local_candidates: HashMap<NetworkType, Vec<Arc<Candidate>>>,
    pub(crate) remote_candidates: HashMap<NetworkType, Vec<Arc<Candidate>>>,

    pub(crate) connection_state: ConnectionState,
    pub(crate) gathering_state: GatheringState,
    pub(crate) started: bool,

    pub(crate) selected_pair: Option<CandidatePair>,
    /// Pairs that completed a check in either direction, sorted by
    /// pair priority descending. Ties keep insertion order.
    pub(crate) valid_pairs: Vec<CandidatePair>,

    pub(crate) pending_binding_requests: Vec<BindingRequest>,

    /// Inbound non-STUN payload awaiting `recv`.
    pub(crate) buffer: Buffer,

    pub(crate) event_tx: mpsc::UnboundedSender<AgentEvent>,
    pub(crate) state_tx: watch::Sender<ConnectionState>,

    pub(crate) connection_timeout: Duration,
    pub(crate) keepalive_interval: Duration,
    pub(crate) check_interval: Duration,
}

impl AgentInner {
    pub(crate) fn new(
        config: &AgentConfig,
        buffer: Buffer,
        event_tx: mpsc::UnboundedSender<AgentEvent>,
        state_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        AgentInner {
            controlling: false,
            tie_breaker: rand::random::<u64>(),

            local_ufrag: generate_ufrag(),
            local_pwd: generate_pwd(),
            remote_ufrag: String::new(),
            remote_pwd: String::new(),

            local_candidates: HashMap::new(),
            remote_candidates: HashMap::new(),

            connection_state: ConnectionState::New,
            gathering_state: GatheringState::New,
            started: false,

            selected_pair: None,
            valid_pairs: vec![],

            pending_binding_requests: vec![],

            buffer,
            event_tx,
            state_tx,

            connection_timeout: config.connection_timeout(),
            keepalive_interval: config.keepalive_interval(),
            check_interval: config.check_interval(),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.connection_state == ConnectionState::Closed
    }

    pub(crate) async fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartConnectivityChecks {
                controlling,
                remote_ufrag,
                remote_pwd,
                resp,
            } => {
                let result = self.start_connectivity_checks(controlling, remote_ufrag, remote_pwd);
                let started = result.is_ok();
                let _ = resp.send(result);
                if started {
                    // Kick off the first round right away instead of
                    // waiting for the ticker.
                    self.contact_candidates().await;
                }
            }
            Command::AddRemoteCandidate { candidate, resp } => {
                self.add_remote_candidate(candidate);
                let _ = resp.send(Ok(()));
            }
            Command::GetLocalCandidates { resp } => {
                let mut out = vec![];
                for candidates in self.local_candidates.values() {
                    out.extend(candidates.iter().cloned());
                }
                let _ = resp.send(out);
            }
            Command::GetLocalCredentials { resp } => {
                let _ = resp.send((self.local_ufrag.clone(), self.local_pwd.clone()));
            }
            Command::GetSelectedPair { resp } => {
                let _ = resp.send(self.selected_pair.clone());
            }
            Command::Write { data, resp } => {
                let _ = resp.send(self.send_payload(&data).await);
            }
            Command::Close { resp } => {
                self.close();
                let _ = resp.send(());
            }
        }
    }

    fn start_connectivity_checks(
        &mut self,
        controlling: bool,
        remote_ufrag: String,
        remote_pwd: String,
    ) -> Result<()> {
        if self.started {
            return Err(Error::ErrMultipleStart);
        }
        if remote_ufrag.is_empty() {
            return Err(Error::ErrRemoteUfragEmpty);
        }
        if remote_pwd.is_empty() {
            return Err(Error::ErrRemotePwdEmpty);
        }

        log::debug!(
            "[{}]: started, remote ufrag {remote_ufrag}",
            role(controlling)
        );

        self.controlling = controlling;
        self.remote_ufrag = remote_ufrag;
        self.remote_pwd = remote_pwd;
        self.started = true;

        self.update_connection_state(ConnectionState::Checking);
        Ok(())
    }

    pub(crate) fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.update_connection_state(ConnectionState::Closed);
        self.gathering_state = GatheringState::Closed;
        self.buffer.close();
    }

    /// Fires the state callback exactly once per transition. `Closed`
    /// is absorbing.
    pub(crate) fn update_connection_state(&mut self, new_state: ConnectionState) {
        if self.connection_state == new_state || self.is_closed() {
            return;
        }

        log::info!(
            "[{}]: connection state changed: {} -> {new_state}",
            role(self.controlling),
            self.connection_state,
        );
        self.connection_state = new_state;
        let _ = self.state_tx.send(new_state);
        let _ = self
            .event_tx
            .send(AgentEvent::ConnectionStateChange(new_state));
    }

    /// Records a pair that completed a check. A selected nomination is
    /// irreversible while connected: re-selecting the same pair (or a
    /// different one) never re-fires the selected-pair callback.
    pub(crate) fn set_valid_pair(
        &mut self,
        local: &Arc<Candidate>,
        remote: &Arc<Candidate>,
        selected: bool,
    ) {
        let pair = CandidatePair::new(Arc::clone(local), Arc::clone(remote), self.controlling);

        if selected && self.selected_pair.is_none() {
            log::trace!("[{}]: selected pair {pair}", role(self.controlling));
            self.selected_pair = Some(pair.clone());
            self.add_valid_pair(pair);

            self.update_connection_state(ConnectionState::Connected);
            let _ = self.event_tx.send(AgentEvent::SelectedCandidatePairChange(
                Arc::clone(local),
                Arc::clone(remote),
            ));
        } else {
            self.add_valid_pair(pair);
        }
    }

    fn add_valid_pair(&mut self, pair: CandidatePair) {
        if self.valid_pairs.contains(&pair) {
            return;
        }
        self.valid_pairs.push(pair);
        // Stable sort: equal priorities keep their insertion order.
        self.valid_pairs
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub(crate) fn best_valid_pair(&self) -> Option<&CandidatePair> {
        self.valid_pairs.first()
    }

    pub(crate) fn add_remote_candidate(&mut self, candidate: Arc<Candidate>) {
        let network_type = candidate.network_type();

        let candidates = self.remote_candidates.entry(network_type).or_default();
        if candidates.iter().any(|c| c.as_ref() == candidate.as_ref()) {
            return;
        }
        log::debug!(
            "[{}]: new remote candidate {candidate}",
            role(self.controlling)
        );
        candidates.push(candidate);
    }

    pub(crate) fn find_remote_candidate(
        &self,
        network_type: NetworkType,
        addr: SocketAddr,
    ) -> Option<Arc<Candidate>> {
        let candidates = self.remote_candidates.get(&network_type)?;
        candidates
            .iter()
            .find(|c| c.address() == addr.ip().to_string() && c.port() == addr.port())
            .cloned()
    }

    /// Routes user payload over the selected pair, falling back to the
    /// best valid pair before nomination finishes.
    pub(crate) async fn send_payload(&mut self, data: &[u8]) -> Result<usize> {
        if self.is_closed() {
            return Err(Error::ErrClosed);
        }

        let pair = match &self.selected_pair {
            Some(pair) => pair.clone(),
            None => self
                .best_valid_pair()
                .cloned()
                .ok_or(Error::ErrNoCandidatePairs)?,
        };

        pair.write(data).await
    }

    // One tick of the connectivity machinery: keep a fresh selected
    // pair alive, or probe every known pair while there is none.
    pub(crate) async fn contact_candidates(&mut self) {
        if !self.started || self.is_closed() {
            return;
        }

        if self.selected_pair.is_some() {
            if self.validate_selected_pair() {
                self.check_keepalive().await;
            }
        } else {
            self.ping_all_candidates().await;
        }
    }

    /// Returns false (and demotes to disconnected) if the selected
    /// pair went receive-silent past the connection timeout.
    pub(crate) fn validate_selected_pair(&mut self) -> bool {
        let Some(pair) = &self.selected_pair else {
            return false;
        };

        if self.connection_timeout == Duration::ZERO {
            return true;
        }

        let silent_for = pair
            .remote
            .last_received()
            .elapsed()
            .unwrap_or(Duration::ZERO);
        if silent_for > self.connection_timeout {
            log::trace!(
                "[{}]: selected pair receive-silent for {silent_for:?}, demoting",
                role(self.controlling)
            );
            self.selected_pair = None;
            self.update_connection_state(ConnectionState::Disconnected);
            return false;
        }

        true
    }

    /// Sends a binding indication on the selected pair when nothing
    /// has been sent on it for a keepalive interval.
    pub(crate) async fn check_keepalive(&mut self) {
        let Some(pair) = self.selected_pair.clone() else {
            return;
        };

        if self.keepalive_interval == Duration::ZERO {
            return;
        }

        let sent_silence = pair
            .local
            .last_sent()
            .elapsed()
            .unwrap_or(Duration::ZERO);
        if sent_silence <= self.keepalive_interval {
            return;
        }

        let message = match Message::build(
            MessageClass::Indication,
            METHOD_BINDING,
            TransactionId::new(),
            vec![Attribute::Fingerprint],
        ) {
            Ok(message) => message,
            Err(err) => {
                log::error!("failed to build keepalive: {err}");
                return;
            }
        };

        self.send_stun(&message, &pair.local, &pair.remote).await;
    }

    /// Probes every (local, remote) combination within one tick.
    /// Iteration order across pairs is the map order and deliberately
    /// unspecified.
    pub(crate) async fn ping_all_candidates(&mut self) {
        let mut pairs = vec![];
        for (network_type, locals) in &self.local_candidates {
            if let Some(remotes) = self.remote_candidates.get(network_type) {
                for local in locals {
                    for remote in remotes {
                        pairs.push((Arc::clone(local), Arc::clone(remote)));
                    }
                }
            }
        }

        if pairs.is_empty() {
            log::trace!(
                "[{}]: no candidate pairs to ping yet",
                role(self.controlling)
            );
        }

        for (local, remote) in pairs {
            self.ping_candidate(&local, &remote).await;
        }
    }

    /// One connectivity check: USERNAME remote:local, PRIORITY, the
    /// role attribute with the tie-breaker, USE-CANDIDATE when
    /// controlling, MESSAGE-INTEGRITY keyed with the remote password,
    /// FINGERPRINT last.
    pub(crate) async fn ping_candidate(&mut self, local: &Arc<Candidate>, remote: &Arc<Candidate>) {
        let username = format!("{}:{}", self.remote_ufrag, self.local_ufrag);

        let mut attributes = vec![
            Attribute::Username(username),
            Attribute::Priority(local.priority()),
        ];
        if self.controlling {
            attributes.push(Attribute::IceControlling(self.tie_breaker));
            attributes.push(Attribute::UseCandidate);
        } else {
            attributes.push(Attribute::IceControlled(self.tie_breaker));
        }
        attributes.push(Attribute::MessageIntegrity(
            self.remote_pwd.as_bytes().to_vec(),
        ));
        attributes.push(Attribute::Fingerprint);

        let message = match Message::build(
            MessageClass::Request,
            METHOD_BINDING,
            TransactionId::new(),
            attributes,
        ) {
            Ok(message) => message,
            Err(err) => {
                log::error!("failed to build binding request: {err}");
                return;
            }
        };

        self.send_binding_request(message, local, remote).await;
    }

    async fn send_binding_request(
        &mut self,
        message: Message,
        local: &Arc<Candidate>,
        remote: &Arc<Candidate>,
    ) {
        log::trace!(
            "[{}]: ping STUN from {local} to {remote}",
            role(self.controlling)
        );

        self.invalidate_pending_binding_requests(Instant::now());
        self.pending_binding_requests.push(BindingRequest {
            timestamp: Instant::now(),
            transaction_id: message.transaction_id,
            destination: remote.addr(),
            is_use_candidate: message.use_candidate(),
        });

        self.send_stun(&message, local, remote).await;
    }

    // Requests older than the transaction timeout will never be
    // answered; stop matching responses against them.
    fn invalidate_pending_binding_requests(&mut self, now: Instant) {
        let before = self.pending_binding_requests.len();
        self.pending_binding_requests.retain(|request| {
            now.saturating_duration_since(request.timestamp) < MAX_BINDING_REQUEST_TIMEOUT
        });

        let expired = before - self.pending_binding_requests.len();
        if expired > 0 {
            log::trace!("discarded {expired} expired binding requests");
        }
    }

    fn take_pending_binding_request(&mut self, id: TransactionId) -> Option<BindingRequest> {
        self.invalidate_pending_binding_requests(Instant::now());
        let index = self
            .pending_binding_requests
            .iter()
            .position(|request| request.transaction_id == id)?;
        Some(self.pending_binding_requests.remove(index))
    }

    async fn send_stun(&self, message: &Message, local: &Arc<Candidate>, remote: &Arc<Candidate>) {
        if let Err(err) = local.write_to(&message.raw, remote).await {
            log::trace!("failed to send STUN message: {err}");
        }
    }

    async fn send_binding_success(
        &mut self,
        request: &Message,
        local: &Arc<Candidate>,
        remote: &Arc<Candidate>,
    ) {
        let addr = remote.addr();

        let response = match Message::build(
            MessageClass::SuccessResponse,
            METHOD_BINDING,
            request.transaction_id,
            vec![
                Attribute::XorMappedAddress {
                    ip: addr.ip(),
                    port: addr.port(),
                },
                Attribute::MessageIntegrity(self.local_pwd.as_bytes().to_vec()),
                Attribute::Fingerprint,
            ],
        ) {
            Ok(response) => response,
            Err(err) => {
                log::warn!("failed to build binding success for {remote}: {err}");
                return;
            }
        };

        self.send_stun(&response, local, remote).await;
    }

    pub(crate) async fn handle_inbound(&mut self, inbound: Inbound) {
        if self.is_closed() {
            return;
        }

        match inbound {
            Inbound::Stun {
                message,
                local,
                from,
            } => self.handle_stun(message, &local, from).await,
            Inbound::Data { data, local, from } => {
                // Count payload only from senders we actually know;
                // decoding it is the caller's business.
                if let Some(remote) = self.find_remote_candidate(local.network_type(), from) {
                    remote.seen(false);
                    if let Err(err) = self.buffer.write(&data) {
                        log::warn!("failed to buffer packet: {err}");
                    }
                } else {
                    log::warn!("discarded {} bytes, {from} is not a known remote", data.len());
                }
            }
        }
    }

    async fn handle_stun(&mut self, message: Message, local: &Arc<Candidate>, from: SocketAddr) {
        if message.method != METHOD_BINDING
            || !matches!(
                message.class,
                MessageClass::Request | MessageClass::SuccessResponse | MessageClass::Indication
            )
        {
            log::trace!(
                "unhandled STUN from {from}: {} {}",
                message.method,
                message.class
            );
            return;
        }

        // Role conflicts are dropped rather than repaired.
        if self.controlling {
            if message.ice_controlling().is_some() {
                log::debug!("inbound controlling, but we are controlling");
                return;
            }
            if message.class == MessageClass::Request && message.use_candidate() {
                log::debug!("inbound USE-CANDIDATE, but we are controlling");
                return;
            }
        } else if message.ice_controlled().is_some() {
            log::debug!("inbound controlled, but we are controlled");
            return;
        }

        let remote_candidate = self.find_remote_candidate(local.network_type(), from);

        match message.class {
            MessageClass::SuccessResponse => {
                if let Err(err) = verify_inbound(&message, self.remote_pwd.as_bytes()) {
                    log::warn!("discarded response from {from}: {err}");
                    return;
                }

                let Some(remote) = remote_candidate else {
                    log::warn!("discarded response from {from}, no such remote candidate");
                    return;
                };

                self.handle_success_response(&message, local, &remote, from);
                remote.seen(false);
            }
            MessageClass::Request => {
                let expected_username = format!("{}:{}", self.local_ufrag, self.remote_ufrag);
                if message.username() != Some(expected_username.as_str()) {
                    log::warn!("discarded request from {from}, username mismatch");
                    return;
                }
                if let Err(err) = verify_inbound(&message, self.local_pwd.as_bytes()) {
                    log::warn!("discarded request from {from}: {err}");
                    return;
                }

                let remote = match remote_candidate {
                    Some(remote) => remote,
                    None => {
                        // An address we never signaled: synthesize a
                        // peer-reflexive candidate for it.
                        log::debug!("adding peer-reflexive candidate for {from}");
                        let prflx = CandidateConfig {
                            address: from.ip().to_string(),
                            port: from.port(),
                            component: local.component(),
                            ..CandidateConfig::default()
                        }
                        .new_peer_reflexive();

                        match prflx {
                            Ok(prflx) => {
                                let prflx = Arc::new(prflx);
                                self.add_remote_candidate(Arc::clone(&prflx));
                                prflx
                            }
                            Err(err) => {
                                log::error!("failed to create prflx candidate for {from}: {err}");
                                return;
                            }
                        }
                    }
                };

                self.handle_binding_request(&message, local, &remote).await;
                remote.seen(false);
            }
            MessageClass::Indication => {
                // Keepalives refresh the receive timestamp, nothing
                // else.
                if let Some(remote) = remote_candidate {
                    remote.seen(false);
                }
            }
            MessageClass::ErrorResponse => {}
        }
    }

    /// A success response promotes the pair to valid; if the matching
    /// request carried USE-CANDIDATE and we control, it also selects
    /// it.
    fn handle_success_response(
        &mut self,
        message: &Message,
        local: &Arc<Candidate>,
        remote: &Arc<Candidate>,
        from: SocketAddr,
    ) {
        let Some(pending) = self.take_pending_binding_request(message.transaction_id) else {
            log::warn!("discarded response from {from}, unknown transaction");
            return;
        };

        // The response must come from where the request went,
        // otherwise the NAT is symmetric and the pair is unusable.
        if pending.destination != from {
            log::debug!(
                "discarded response: transaction destination {} != source {from}",
                pending.destination
            );
            return;
        }

        let selected = self.controlling && pending.is_use_candidate;
        self.set_valid_pair(local, remote, selected);
    }

    /// A valid binding request is answered with a success response; on
    /// the controlled side USE-CANDIDATE promotes the pair it arrived
    /// on.
    async fn handle_binding_request(
        &mut self,
        message: &Message,
        local: &Arc<Candidate>,
        remote: &Arc<Candidate>,
    ) {
        log::trace!(
            "[{}]: inbound STUN request from {remote} to {local}",
            role(self.controlling)
        );

        self.send_binding_success(message, local, remote).await;

        let selected = !self.controlling && message.use_candidate();
        self.set_valid_pair(local, remote, selected);
    }
}

fn verify_inbound(message: &Message, key: &[u8]) -> Result<()> {
    message.verify_integrity(key)?;
    if message.contains(stun::attributes::ATTR_FINGERPRINT) {
        message.verify_fingerprint()?;
    }
    Ok(())
}

pub(crate) fn role(controlling: bool) -> &'static str {
    if controlling {
        "controlling"
    } else {
        "controlled"
    }
}
