use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::dns_message::DnsMessage;
use crate::error::{ServerError, WireError};
use crate::forwarder::Forwarder;
use crate::local::{Resolve, SyntheticResolver};
use crate::shutdown::Shutdown;

/// How long a single read waits before the shutdown flag is checked again.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest datagram read from a client; longer queries are truncated.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// The datagram operations the server loop needs from its listener.
pub trait PacketSocket {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl PacketSocket for UdpSocket {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf)
    }

    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, addr)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UdpSocket::set_read_timeout(self, timeout)
    }
}

/// DNS Server that handles incoming DNS requests
pub struct DnsServer<S = UdpSocket, R = SyntheticResolver> {
    socket: S,
    forwarder: Option<Forwarder>,
    resolver: R,
}

impl DnsServer<UdpSocket> {
    /// Create a new DNS server bound to the given address
    pub fn bind(addr: impl ToSocketAddrs, config: &ServerConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        Ok(Self::new(socket, config))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl<S: PacketSocket> DnsServer<S> {
    /// Wrap an already bound socket. Forwarding is decided here, once.
    pub fn new(socket: S, config: &ServerConfig) -> Self {
        let forwarder = config
            .should_forward()
            .then(|| Forwarder::new(config.resolver.clone()));

        DnsServer {
            socket,
            forwarder,
            resolver: SyntheticResolver,
        }
    }
}

impl<S: PacketSocket, R: Resolve> DnsServer<S, R> {
    /// Replace the policy used to answer questions locally.
    pub fn with_resolver<T: Resolve>(self, resolver: T) -> DnsServer<S, T> {
        DnsServer {
            socket: self.socket,
            forwarder: self.forwarder,
            resolver,
        }
    }

    pub fn is_forwarding(&self) -> bool {
        self.forwarder.is_some()
    }

    /// Serve datagrams one at a time until `shutdown` is requested or the
    /// listener fails. The socket is closed when this returns.
    pub fn run(self, shutdown: &Shutdown) -> Result<(), ServerError> {
        if let Some(forwarder) = &self.forwarder {
            info!(resolver = forwarder.resolver_addr(), "Forwarding requests to resolver");
        }

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            if shutdown.is_requested() {
                info!("Shutdown requested, closing listener");
                return Ok(());
            }

            self.socket
                .set_read_timeout(Some(READ_TIMEOUT))
                .map_err(ServerError::ListenerFatal)?;

            let (size, source) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if is_timeout(&e) => continue,
                Err(e) => {
                    error!(error = %e, "Error reading from listener");
                    return Err(ServerError::ListenerFatal(e));
                }
            };

            debug!(%source, bytes = size, "Received request");

            match self.handle_request(&buf[..size]) {
                Ok(response) => {
                    if let Err(e) = self.socket.send_to(&response, source) {
                        error!(%source, error = %e, "Failed to send response");
                    }
                }
                Err(e) => {
                    warn!(%source, error = %e, "Dropping malformed request");
                }
            }
        }
    }

    /// Decode a query and produce the bytes to send back.
    fn handle_request(&self, query: &[u8]) -> Result<Bytes, WireError> {
        let mut message = DnsMessage::from_bytes(query)?;

        let Some(forwarder) = &self.forwarder else {
            message.process_questions(&self.resolver);
            debug!(
                id = message.header.id,
                answers = message.header.answer_count,
                flags = ?message.header.decoded_flags(),
                "Answering locally"
            );
            return message.to_bytes();
        };

        match forwarder.forward(query) {
            Ok(reply) => Ok(Bytes::from(reply)),
            Err(e) => {
                error!(error = %e, "Error forwarding query, replying with SERVFAIL");
                message.into_server_failure().to_bytes()
            }
        }
    }
}

/// Read timeouts surface as `WouldBlock` or `TimedOut` depending on the
/// platform; a signal landing mid-read shows up as `Interrupted`.
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
