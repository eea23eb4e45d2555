
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::time::Duration;

use crate::error::{Error, Result};
use crate::message::{is_message, Message, MessageClass, TransactionId, METHOD_BINDING};

/// How long a binding transaction may take before the gathering step
/// gives up on a server.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_MESSAGE_SIZE: usize = 1500;

/// Performs one binding request/response round trip over a socket the
/// caller keeps, returning the reflexive transport address the server
/// saw. Responses from other peers, with foreign transaction ids, or
/// that fail to decode are skipped until `deadline` expires.
pub async fn binding_request(
    socket: &UdpSocket,
    server: SocketAddr,
    deadline: Option<Duration>,
) -> Result<SocketAddr> {
    let transaction_id = TransactionId::new();
    let request = Message::build(
        MessageClass::Request,
        METHOD_BINDING,
        transaction_id,
        vec![],
    )?;
    socket.send_to(&request.raw, server).await?;

    let deadline = deadline.unwrap_or(DEFAULT_TIMEOUT);
    tokio::time::timeout(deadline, wait_for_response(socket, server, transaction_id))
        .await
        .map_err(|_| Error::TransactionTimeOut)?
}

async fn wait_for_response(
    socket: &UdpSocket,
    server: SocketAddr,
    transaction_id: TransactionId,
) -> Result<SocketAddr> {
    let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
    loop {
        let (n, src) = socket.recv_from(&mut buf).await?;
        if src != server || !is_message(&buf[..n]) {
            continue;
        }

        let msg = match Message::parse(&buf[..n]) {
            Ok(msg) => msg,
            Err(err) => {
                log::debug!("discarding malformed STUN response from {src}: {err}");
                continue;
            }
        };

        if msg.transaction_id != transaction_id
            || msg.class != MessageClass::SuccessResponse
            || msg.method != METHOD_BINDING
        {
            continue;
        }

        let (ip, port) = msg.xor_mapped_address().ok_or(Error::AttributeNotFound)?;
        return Ok(SocketAddr::new(ip, port));
    }
}
