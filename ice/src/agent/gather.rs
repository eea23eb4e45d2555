use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use stun::client;
use tokio::net::{lookup_host, UdpSocket};
use tokio::sync::{mpsc, watch};

use super::config::AgentConfig;
use super::internal::{AgentInner, Inbound};
use crate::candidate::{Candidate, CandidateConfig, CandidateType, RelatedAddress, RECEIVE_MTU};
use crate::error::{Error, Result};
use crate::network_type::NetworkType;
use crate::state::GatheringState;
use crate::url::SchemeType;

/// Gathers the local candidates into `inner`: one bound socket and
/// host candidate per (network type, interface address), then one
/// server-reflexive candidate per STUN server that answers, sharing
/// the host socket it was discovered through. Runs once, before the
/// task loop starts; the non-trickle lifecycle is new -> complete.
pub(crate) async fn gather_candidates(inner: &mut AgentInner, config: &AgentConfig) -> Result<()> {
    inner.gathering_state = GatheringState::Gathering;

    gather_host_candidates(inner, config).await?;

    if config
        .candidate_types()
        .contains(&CandidateType::ServerReflexive)
    {
        gather_server_reflexive_candidates(inner, config).await;
    }

    inner.gathering_state = GatheringState::Complete;
    Ok(())
}

async fn gather_host_candidates(inner: &mut AgentInner, config: &AgentConfig) -> Result<()> {
    let network_types = config.network_types();

    for ip in local_ips(config) {
        let network_type = if ip.is_ipv4() {
            NetworkType::Udp4
        } else {
            NetworkType::Udp6
        };
        if !network_types.contains(&network_type) {
            continue;
        }

        let socket =
            match listen_udp_in_port_range(config.port_min, config.port_max, ip).await {
                Ok(socket) => Arc::new(socket),
                Err(Error::ErrNoPortAvailable) => return Err(Error::ErrNoPortAvailable),
                Err(err) => {
                    log::warn!("could not listen on {ip}: {err}");
                    continue;
                }
            };
        let port = socket.local_addr()?.port();

        let candidate = CandidateConfig {
            address: ip.to_string(),
            port,
            conn: Some(socket),
            ..CandidateConfig::default()
        }
        .new_host()?;

        log::debug!("gathered host candidate {candidate}");
        inner
            .local_candidates
            .entry(network_type)
            .or_default()
            .push(Arc::new(candidate));
    }

    Ok(())
}

// A server that never answers must not stall construction for longer
// than the STUN client allows (5 seconds per server).
async fn gather_server_reflexive_candidates(inner: &mut AgentInner, config: &AgentConfig) {
    for url in &config.urls {
        if url.scheme != SchemeType::Stun {
            // TURN relay allocation is reserved.
            continue;
        }

        let server = match resolve_stun_server(&url.host, url.port).await {
            Ok(server) => server,
            Err(err) => {
                log::warn!("could not resolve {url}: {err}");
                continue;
            }
        };

        let network_type = if server.is_ipv4() {
            NetworkType::Udp4
        } else {
            NetworkType::Udp6
        };
        let Some(hosts) = inner.local_candidates.get(&network_type) else {
            continue;
        };

        let mut reflexive = vec![];
        for host in hosts {
            let Some(socket) = &host.conn else {
                continue;
            };

            let mapped = match client::binding_request(socket, server, None).await {
                Ok(mapped) => mapped,
                Err(err) => {
                    log::warn!("binding request to {url} from {host} failed: {err}");
                    continue;
                }
            };

            let candidate = CandidateConfig {
                address: mapped.ip().to_string(),
                port: mapped.port(),
                component: host.component(),
                related_address: Some(RelatedAddress {
                    address: host.address(),
                    port: host.port(),
                }),
                conn: Some(Arc::clone(socket)),
                ..CandidateConfig::default()
            }
            .new_server_reflexive();

            match candidate {
                Ok(candidate) => {
                    log::debug!("gathered server-reflexive candidate {candidate}");
                    reflexive.push(Arc::new(candidate));
                }
                Err(err) => log::warn!("failed to build srflx candidate: {err}"),
            }
        }

        if let Some(candidates) = inner.local_candidates.get_mut(&network_type) {
            candidates.extend(reflexive);
        }
    }
}

fn local_ips(config: &AgentConfig) -> Vec<IpAddr> {
    let mut ips: Vec<IpAddr> = util::ifaces::local_interfaces()
        .into_iter()
        .filter(|ip| config.include_loopback || !ip.is_loopback())
        .filter(|ip| !ip.is_unspecified())
        .filter(|ip| config.ip_filter.as_ref().map_or(true, |keep| keep(*ip)))
        .collect();
    ips.dedup();
    ips
}

async fn resolve_stun_server(host: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = lookup_host((host, port)).await?;
    addrs.next().ok_or(Error::ErrHost)
}

/// Binds a UDP socket on `ip` inside the configured port range,
/// retrying sequentially from port_min to port_max. A (0, 0) range
/// means any ephemeral port.
pub(crate) async fn listen_udp_in_port_range(
    port_min: u16,
    port_max: u16,
    ip: IpAddr,
) -> Result<UdpSocket> {
    if port_min == 0 && port_max == 0 {
        return Ok(UdpSocket::bind(SocketAddr::new(ip, 0)).await?);
    }

    let low = if port_min == 0 { 1 } else { port_min };
    let high = if port_max == 0 { u16::MAX } else { port_max };
    if low > high {
        return Err(Error::ErrNoPortAvailable);
    }

    for port in low..=high {
        if let Ok(socket) = UdpSocket::bind(SocketAddr::new(ip, port)).await {
            return Ok(socket);
        }
    }

    Err(Error::ErrNoPortAvailable)
}

/// One reader task per host socket. It demultiplexes by first byte:
/// STUN messages are parsed here and submitted as typed events, all
/// other traffic goes to the loop as opaque payload. A socket error
/// is normal termination (the agent closed the socket).
pub(crate) fn spawn_socket_reader(
    candidate: Arc<Candidate>,
    socket: Arc<UdpSocket>,
    packet_tx: mpsc::Sender<Inbound>,
    mut closed_rx: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let mut buffer = vec![0u8; RECEIVE_MTU];
        loop {
            let (n, from) = tokio::select! {
                result = socket.recv_from(&mut buffer) => match result {
                    Ok(pair) => pair,
                    Err(err) => {
                        log::debug!("read loop on {candidate} exited: {err}");
                        return;
                    }
                },
                _ = closed_rx.changed() => return,
            };

            let data = &buffer[..n];
            let inbound = if stun::is_message(data) {
                match stun::Message::parse(data) {
                    Ok(message) => Inbound::Stun {
                        message,
                        local: Arc::clone(&candidate),
                        from,
                    },
                    Err(err) => {
                        log::warn!("dropping malformed STUN from {from}: {err}");
                        continue;
                    }
                }
            } else {
                Inbound::Data {
                    data: data.to_vec(),
                    local: Arc::clone(&candidate),
                    from,
                }
            };

            if packet_tx.send(inbound).await.is_err() {
                // Loop is gone, nothing left to deliver to.
                return;
            }
        }
    });
}
