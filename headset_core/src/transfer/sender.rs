use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::protocol::{self, TransferOutcome};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::constants::ACK_BUFFER_SIZE;

/// Delivers one encoded frame over TCP and reads the single acknowledgment
#[derive(Debug, Clone)]
pub struct TransferClient {
    pub port: u16,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
}

impl TransferClient {
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            port: config.transfer_port,
            connect_timeout: config.connect_timeout(),
            io_timeout: config.io_timeout(),
        }
    }

    /// Make exactly one delivery attempt of `message` to `address`.
    ///
    /// The connection is closed before returning, whatever the outcome.
    pub async fn send(
        &self,
        message: &[u8],
        address: IpAddr,
        cancel: &CancellationToken,
    ) -> TransferOutcome {
        let result = tokio::select! {
            _ = cancel.cancelled() => Err(TransferError::Cancelled),
            res = self.deliver(message, SocketAddr::new(address, self.port)) => res,
        };

        if let Err(e) = &result {
            tracing::warn!("Failed to transfer model to {}: {}", address, e);
        }
        result.into()
    }

    async fn deliver(&self, message: &[u8], target: SocketAddr) -> Result<(), TransferError> {
        tracing::info!("Connecting to {}", target);
        let mut stream = match timeout(self.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(TransferError::ConnectFailed(e)),
            Err(_) => {
                return Err(TransferError::ConnectFailed(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connection timed out",
                )));
            }
        };

        tracing::info!("Connection established. Sending {} bytes...", message.len());
        let write = async {
            stream.write_all(message).await?;
            stream.flush().await
        };
        match timeout(self.io_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(TransferError::SendFailed(e)),
            Err(_) => {
                return Err(TransferError::SendFailed(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "write timed out",
                )));
            }
        }

        tracing::info!("Data sent. Waiting for acknowledgment...");
        let mut buf = [0u8; ACK_BUFFER_SIZE];
        let n = match timeout(self.io_timeout, stream.read(&mut buf)).await {
            Ok(Ok(0)) => return Err(TransferError::NoAcknowledgment),
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(TransferError::AckReadFailed(e)),
            Err(_) => return Err(TransferError::AckTimeout),
        };

        let _ = stream.shutdown().await;

        let outcome = protocol::decode_ack(&buf[..n]);
        if outcome.is_success() {
            tracing::info!("Model transferred successfully to {}", target);
        }
        outcome.into_result()
    }
}
