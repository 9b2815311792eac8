use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ForwardError;

/// Budget for one upstream round trip, send and receive together.
pub const FORWARD_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest upstream reply that is relayed.
pub const MAX_REPLY_SIZE: usize = 1024;

/// Relays raw queries to a single upstream resolver.
#[derive(Debug, Clone)]
pub struct Forwarder {
    resolver_addr: String,
    upstream: Option<SocketAddr>,
    timeout: Duration,
}

impl Forwarder {
    /// The resolver address is looked up here, once, so hostname resolution
    /// stays out of the per-query deadline. If that lookup fails it is
    /// retried on each query instead.
    pub fn new(resolver_addr: impl Into<String>) -> Self {
        let resolver_addr = resolver_addr.into();
        let upstream = match lookup(&resolver_addr) {
            Ok(addr) => Some(addr),
            Err(e) => {
                warn!(resolver = %resolver_addr, error = %e, "Could not resolve upstream yet");
                None
            }
        };

        Forwarder {
            resolver_addr,
            upstream,
            timeout: FORWARD_TIMEOUT,
        }
    }

    pub fn resolver_addr(&self) -> &str {
        &self.resolver_addr
    }

    /// Send `query` upstream on a fresh socket and return the reply verbatim.
    /// The socket is dropped, and so closed, on every return path.
    pub fn forward(&self, query: &[u8]) -> Result<Vec<u8>, ForwardError> {
        self.round_trip(query)
            .map_err(|source| ForwardError::ForwardUnavailable {
                resolver: self.resolver_addr.clone(),
                source,
            })
    }

    fn round_trip(&self, query: &[u8]) -> io::Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;

        let upstream = match self.upstream {
            Some(addr) => addr,
            None => lookup(&self.resolver_addr)?,
        };
        let bind_addr: SocketAddr = if upstream.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(upstream)?;

        socket.set_write_timeout(Some(remaining(deadline)?))?;
        socket.send(query)?;

        socket.set_read_timeout(Some(remaining(deadline)?))?;
        let mut reply = vec![0u8; MAX_REPLY_SIZE];
        let size = socket.recv(&mut reply)?;
        reply.truncate(size);

        debug!(resolver = %upstream, bytes = size, "Upstream replied");
        Ok(reply)
    }
}

fn lookup(resolver_addr: &str) -> io::Result<SocketAddr> {
    resolver_addr.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address for {}", resolver_addr),
        )
    })
}

/// Time left before `deadline`, or a timeout error once it has passed.
fn remaining(deadline: Instant) -> io::Result<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "forwarding deadline exceeded",
        ));
    }
    Ok(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_forward_relays_reply_verbatim() {
        let upstream = UdpSocket::bind("127.0.0.1:0").unwrap();
        let upstream_addr = upstream.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 512];
            let (size, peer) = upstream.recv_from(&mut buf).unwrap();
            let mut reply = buf[..size].to_vec();
            reply.extend_from_slice(b"-reply");
            upstream.send_to(&reply, peer).unwrap();
        });

        let forwarder = Forwarder::new(upstream_addr.to_string());
        let reply = forwarder.forward(b"query").unwrap();
        handle.join().unwrap();

        assert_eq!(reply, b"query-reply".to_vec());
    }

    #[test]
    fn test_forward_to_silent_resolver_fails() {
        // Bound but never answers, so the read hits the deadline.
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let forwarder = Forwarder::new(silent.local_addr().unwrap().to_string());

        let started = Instant::now();
        let result = forwarder.forward(b"query");

        assert!(matches!(
            result,
            Err(ForwardError::ForwardUnavailable { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_forward_to_closed_port_fails() {
        let closed_addr = {
            let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
            socket.local_addr().unwrap()
        };

        let forwarder = Forwarder::new(closed_addr.to_string());
        assert!(forwarder.forward(b"query").is_err());
    }

    #[test]
    fn test_resolver_address_is_looked_up_once() {
        let forwarder = Forwarder::new("127.0.0.1:5300");
        assert_eq!(forwarder.upstream, Some("127.0.0.1:5300".parse().unwrap()));

        let unresolved = Forwarder::new("not an address");
        assert_eq!(unresolved.upstream, None);
    }

    #[test]
    fn test_unparseable_resolver_fails() {
        let forwarder = Forwarder::new("not an address");
        let err = forwarder.forward(b"query").unwrap_err();
        assert!(err.to_string().contains("not an address"));
    }
}
