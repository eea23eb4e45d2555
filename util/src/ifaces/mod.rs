use std::net::IpAddr;

/// Returns every unicast IP address assigned to a local interface,
/// loopback included. Callers decide which families and scopes they
/// want to keep.
#[cfg(unix)]
pub fn local_interfaces() -> Vec<IpAddr> {
    let mut ips = vec![];

    let addrs = match nix::ifaddrs::getifaddrs() {
        Ok(addrs) => addrs,
        Err(err) => {
            log::warn!("getifaddrs failed: {err}");
            return ips;
        }
    };

    for ifaddr in addrs {
        let Some(storage) = ifaddr.address else {
            continue;
        };
        if let Some(sin) = storage.as_sockaddr_in() {
            ips.push(IpAddr::V4(sin.ip()));
        } else if let Some(sin6) = storage.as_sockaddr_in6() {
            ips.push(IpAddr::V6(sin6.ip()));
        }
    }

    ips
}

#[cfg(not(unix))]
pub fn local_interfaces() -> Vec<IpAddr> {
    use std::net::Ipv4Addr;
    vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]
}
