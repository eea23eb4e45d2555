use tokio::sync::{mpsc, oneshot};

use super::internal::Command;
use crate::error::{Error, Result};
use util::Buffer;

/// The byte-stream connection an agent exposes once checks succeed.
/// `recv` drains inbound non-STUN traffic; `send` routes through the
/// selected (or best valid) candidate pair.
pub struct AgentConn {
    pub(crate) cmd_tx: mpsc::Sender<Command>,
    pub(crate) buffer: Buffer,
}

impl AgentConn {
    pub(crate) fn new(cmd_tx: mpsc::Sender<Command>, buffer: Buffer) -> Self {
        AgentConn { cmd_tx, buffer }
    }

    /// Blocks until at least one application packet arrives on any of
    /// the agent's sockets and copies it into `buf`. Returns a closed
    /// error once the agent shuts down and the backlog is drained.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        self.buffer.read(buf, None).await.map_err(|err| match err {
            util::Error::BufferClosed => Error::ErrClosed,
            other => Error::Util(other),
        })
    }

    /// Sends one datagram's worth of payload to the remote agent.
    /// Payloads that themselves parse as STUN are refused: the control
    /// plane owns that space on the wire.
    pub async fn send(&self, buf: &[u8]) -> Result<usize> {
        if stun::is_message(buf) {
            return Err(Error::ErrIceWriteStunMessage);
        }

        let (resp, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Write {
                data: buf.to_vec(),
                resp,
            })
            .await
            .map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)?
    }

    /// Closes the owning agent. Idempotent.
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
