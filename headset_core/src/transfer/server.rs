use crate::AppEvent;
use crate::protocol::ACK_ERROR;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::receiver::receive_asset;

/// Accept incoming asset transfers until cancelled.
///
/// Each connection carries exactly one frame and gets exactly one
/// acknowledgment: `Success` once the asset is stored, `Error` otherwise.
pub async fn run_server(
    listener: TcpListener,
    download_dir: PathBuf,
    max_payload: u64,
    event_tx: mpsc::Sender<AppEvent>,
    cancel: CancellationToken,
) {
    loop {
        let accepted = tokio::select! {
            _ = cancel.cancelled() => break,
            res = listener.accept() => res,
        };

        let (mut stream, remote_addr) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to accept transfer connection: {}", e);
                continue;
            }
        };

        let event_tx = event_tx.clone();
        let download_dir = download_dir.clone();

        tokio::spawn(async move {
            tracing::info!("Connection from {}", remote_addr);
            if let Err(e) =
                receive_asset(&mut stream, &download_dir, max_payload, &event_tx).await
            {
                tracing::warn!("Receive error ({}): {:#}", remote_addr, e);
                let _ = stream.write_all(ACK_ERROR).await;
                let _ = event_tx
                    .send(AppEvent::Error(format!(
                        "Receive error ({}): {:#}",
                        remote_addr, e
                    )))
                    .await;
            }
        });
    }
}
