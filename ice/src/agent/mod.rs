
pub mod config;
pub(crate) mod gather;
pub(crate) mod internal;
pub mod transport;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::time::MissedTickBehavior;

use crate::candidate::{Candidate, CandidatePair};
use crate::error::{Error, Result};
use crate::state::ConnectionState;
pub use config::AgentConfig;
use internal::{AgentEvent, AgentInner, Command, Inbound};
pub use transport::AgentConn;

pub type OnConnectionStateChangeHdlrFn = Box<
    dyn (FnMut(ConnectionState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;
pub type OnSelectedCandidatePairChangeHdlrFn = Box<
    dyn (FnMut(&Arc<Candidate>, &Arc<Candidate>) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

#[derive(Default)]
struct Handlers {
    on_connection_state_change: Mutex<Option<OnConnectionStateChangeHdlrFn>>,
    on_selected_candidate_pair_change: Mutex<Option<OnSelectedCandidatePairChangeHdlrFn>>,
}

/// An ICE agent: gathers local candidates at construction, probes
/// local×remote pairs once credentials are exchanged, nominates a
/// working pair, and keeps it alive.
///
/// All state lives inside a single task loop; this handle only submits
/// commands to it and waits for the answers.
pub struct Agent {
    cmd_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    conn: Arc<AgentConn>,
    handlers: Arc<Handlers>,
}

impl Agent {
    /// Creates an agent and gathers its candidates. Fails when no
    /// socket can be bound inside the configured port range.
    pub async fn new(config: AgentConfig) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::New);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (packet_tx, packet_rx) = mpsc::channel(64);
        let (closed_tx, closed_rx) = watch::channel(false);

        let buffer = util::Buffer::new(0, config::MAX_BUFFER_SIZE);

        let mut inner = AgentInner::new(&config, buffer.clone(), event_tx, state_tx);
        gather::gather_candidates(&mut inner, &config).await?;

        // Every gathered host socket gets its own reader task feeding
        // the loop.
        for candidates in inner.local_candidates.values() {
            for candidate in candidates {
                if candidate.candidate_type() != crate::candidate::CandidateType::Host {
                    continue;
                }
                if let Some(socket) = &candidate.conn {
                    gather::spawn_socket_reader(
                        Arc::clone(candidate),
                        Arc::clone(socket),
                        packet_tx.clone(),
                        closed_rx.clone(),
                    );
                }
            }
        }

        let handlers = Arc::new(Handlers::default());
        spawn_event_dispatcher(event_rx, Arc::clone(&handlers));

        tokio::spawn(run_loop(inner, cmd_rx, packet_rx, closed_tx));

        let conn = Arc::new(AgentConn::new(cmd_tx.clone(), buffer));

        Ok(Agent {
            cmd_tx,
            state_rx,
            conn,
            handlers,
        })
    }

    /// Sets a handler fired on every connection state transition.
    pub async fn on_connection_state_change(&self, f: OnConnectionStateChangeHdlrFn) {
        *self.handlers.on_connection_state_change.lock().await = Some(f);
    }

    /// Sets a handler fired when a candidate pair is first selected.
    pub async fn on_selected_candidate_pair_change(&self, f: OnSelectedCandidatePairChangeHdlrFn) {
        *self.handlers.on_selected_candidate_pair_change.lock().await = Some(f);
    }

    /// Adds a candidate signaled by the remote side. Allowed before or
    /// during checking.
    pub async fn add_remote_candidate(&self, candidate: Arc<Candidate>) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::AddRemoteCandidate { candidate, resp })
            .await
            .map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)?
    }

    pub async fn get_local_candidates(&self) -> Result<Vec<Arc<Candidate>>> {
        let (resp, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::GetLocalCandidates { resp })
            .await
            .map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)
    }

    /// Returns the (ufrag, pwd) this agent signals to its peer.
    pub async fn get_local_user_credentials(&self) -> Result<(String, String)> {
        let (resp, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::GetLocalCredentials { resp })
            .await
            .map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)
    }

    pub async fn get_selected_candidate_pair(&self) -> Result<Option<CandidatePair>> {
        let (resp, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::GetSelectedPair { resp })
            .await
            .map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)
    }

    /// The current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Starts checks as the controlling agent and blocks until a pair
    /// connects, the cancel channel fires, or the agent closes.
    pub async fn dial(
        &self,
        cancel_rx: mpsc::Receiver<()>,
        remote_ufrag: String,
        remote_pwd: String,
    ) -> Result<Arc<AgentConn>> {
        self.connect(true, cancel_rx, remote_ufrag, remote_pwd).await
    }

    /// Starts checks as the controlled agent and blocks until the
    /// controlling peer nominates a pair.
    pub async fn accept(
        &self,
        cancel_rx: mpsc::Receiver<()>,
        remote_ufrag: String,
        remote_pwd: String,
    ) -> Result<Arc<AgentConn>> {
        self.connect(false, cancel_rx, remote_ufrag, remote_pwd)
            .await
    }

    async fn connect(
        &self,
        controlling: bool,
        mut cancel_rx: mpsc::Receiver<()>,
        remote_ufrag: String,
        remote_pwd: String,
    ) -> Result<Arc<AgentConn>> {
        let (resp, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::StartConnectivityChecks {
                controlling,
                remote_ufrag,
                remote_pwd,
                resp,
            })
            .await
            .map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)??;

        let mut state_rx = self.state_rx.clone();
        loop {
            match *state_rx.borrow() {
                ConnectionState::Connected | ConnectionState::Completed => {
                    return Ok(Arc::clone(&self.conn));
                }
                ConnectionState::Closed => return Err(Error::ErrClosed),
                _ => {}
            }

            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        return Err(Error::ErrClosed);
                    }
                }
                _ = cancel_rx.recv() => return Err(Error::ErrCanceledByCaller),
            }
        }
    }

    /// Shuts the agent down: cancels the loop, closes every owned
    /// socket, and unblocks pending reads with a closed error.
    /// Idempotent.
    pub async fn close(&self) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(Command::Close { resp })
            .await
            .is_err()
        {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }
}

/// The serializing task loop: the only writer of agent state. It
/// drains user commands, inbound packets from the socket readers, and
/// a periodic tick driving checks and keepalives, strictly one at a
/// time.
async fn run_loop(
    mut inner: AgentInner,
    mut cmd_rx: mpsc::Receiver<Command>,
    mut packet_rx: mpsc::Receiver<Inbound>,
    closed_tx: watch::Sender<bool>,
) {
    // A zero interval would make tokio panic; checks are effectively
    // driven by inbound traffic alone in that case.
    let period = if inner.check_interval.is_zero() {
        config::DEFAULT_CHECK_INTERVAL
    } else {
        inner.check_interval
    };
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = cmd_rx.recv() => match command {
                Some(command) => inner.handle_command(command).await,
                // All handles dropped without an explicit close.
                None => inner.close(),
            },
            Some(inbound) = packet_rx.recv() => inner.handle_inbound(inbound).await,
            _ = ticker.tick() => inner.contact_candidates().await,
        }

        if inner.is_closed() {
            break;
        }
    }

    // Stop the reader tasks; dropping the candidates afterwards closes
    // their sockets.
    let _ = closed_tx.send(true);
}

fn spawn_event_dispatcher(
    mut event_rx: mpsc::UnboundedReceiver<AgentEvent>,
    handlers: Arc<Handlers>,
) {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AgentEvent::ConnectionStateChange(state) => {
                    let mut handler = handlers.on_connection_state_change.lock().await;
                    if let Some(f) = handler.as_mut() {
                        f(state).await;
                    }
                }
                AgentEvent::SelectedCandidatePairChange(local, remote) => {
                    let mut handler = handlers.on_selected_candidate_pair_change.lock().await;
                    if let Some(f) = handler.as_mut() {
                        f(&local, &remote).await;
                    }
                }
            }
        }
    });
}
