//! UDP discovery: resolve a pairing code to the address of one headset.
//!
//! The host broadcasts the code and waits for a headset showing that code to
//! answer with [`DISCOVERY_RESPONSE`]. The first matching reply wins; there
//! is no de-duplication or ranking when several headsets would answer.

use crate::config::TransferConfig;
use crate::error::DiscoveryError;
use crate::pairing::PairingCode;
use crate::protocol::{self, DISCOVERY_RESPONSE};
use crate::AppEvent;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Port headsets listen on for discovery broadcasts
pub const DISCOVERY_PORT: u16 = 5001;

/// Port the host listens on for the discovery reply
pub const LISTEN_PORT: u16 = 5002;

/// Total time to wait for a reply after the broadcast
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

const RECV_BUFFER_SIZE: usize = 1024;

/// Resolves a pairing code with a single broadcast
#[derive(Debug, Clone)]
pub struct Resolver {
    pub discovery_port: u16,
    pub listen_port: u16,
    pub broadcast_addr: IpAddr,
    pub timeout: Duration,
}

impl Resolver {
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            discovery_port: config.discovery_port,
            listen_port: config.listen_port,
            broadcast_addr: config.broadcast_addr,
            timeout: config.discovery_timeout(),
        }
    }

    /// Broadcast `code` and return the address of the first headset to answer.
    ///
    /// The timeout is one overall deadline starting after the broadcast is
    /// sent. Datagrams that are not a discovery response are skipped without
    /// extending it.
    pub async fn resolve(
        &self,
        code: &PairingCode,
        cancel: &CancellationToken,
    ) -> Result<IpAddr, DiscoveryError> {
        let bind_ip = match self.broadcast_addr {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(bind_ip, self.listen_port))
            .await
            .map_err(DiscoveryError::NetworkError)?;
        if self.broadcast_addr.is_ipv4() {
            socket
                .set_broadcast(true)
                .map_err(DiscoveryError::NetworkError)?;
        }

        let target = SocketAddr::new(self.broadcast_addr, self.discovery_port);
        socket
            .send_to(&protocol::discovery_request(code), target)
            .await
            .map_err(|e| {
                tracing::error!("Failed to send discovery broadcast to {}: {}", target, e);
                DiscoveryError::NetworkError(e)
            })?;
        tracing::info!(
            "Broadcasting discovery message with code '{}' on port {}",
            code,
            self.discovery_port
        );

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
                res = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)) => res,
            };

            match received {
                Ok(Ok((len, from))) => {
                    if let Some(ip) = accept_response(&buf[..len], from) {
                        tracing::info!("Discovered headset at {}", ip);
                        return Ok(ip);
                    }
                    tracing::debug!("Ignoring {} byte datagram from {}", len, from);
                }
                Ok(Err(e)) => {
                    tracing::error!("Error during discovery: {}", e);
                    return Err(DiscoveryError::NetworkError(e));
                }
                Err(_) => {
                    tracing::info!("Discovery timeout reached");
                    return Err(DiscoveryError::Timeout);
                }
            }
        }
    }
}

/// The address to connect to if `payload` is a discovery response
pub fn accept_response(payload: &[u8], from: SocketAddr) -> Option<IpAddr> {
    protocol::is_discovery_response(payload).then(|| from.ip())
}

/// Headset side of discovery: answers broadcasts carrying its pairing code
pub struct DiscoveryResponder {
    socket: UdpSocket,
    code: PairingCode,
}

impl DiscoveryResponder {
    pub async fn bind(port: u16, code: PairingCode) -> Result<Self, std::io::Error> {
        // Bind to 0.0.0.0 to receive broadcasts on all interfaces
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
        socket.set_broadcast(true)?;
        Ok(Self { socket, code })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn code(&self) -> &PairingCode {
        &self.code
    }

    /// Answer matching requests until cancelled or the socket fails
    pub async fn run(self, event_tx: mpsc::Sender<AppEvent>, cancel: CancellationToken) {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                res = self.socket.recv_from(&mut buf) => res,
            };

            let (len, from) = match received {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!("Discovery responder stopped: {}", e);
                    break;
                }
            };

            if !self.code.matches(&buf[..len]) {
                // Someone else's code, or not our protocol at all
                continue;
            }

            if let Err(e) = self.socket.send_to(DISCOVERY_RESPONSE, from).await {
                tracing::warn!("Failed to answer discovery from {}: {}", from, e);
                continue;
            }
            tracing::info!("Answered discovery request from {}", from);
            let _ = event_tx.send(AppEvent::DiscoveryAnswered { from }).await;
        }
    }
}
