use crate::AppEvent;
use crate::protocol::{ACK_SUCCESS, read_message};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::utils::sanitize_file_name;

/// Receive one asset from the stream, store it and acknowledge it.
///
/// Returns the path the asset was written to.
pub async fn receive_asset<S>(
    stream: &mut S,
    download_dir: &Path,
    max_payload: u64,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<PathBuf>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let message = read_message(stream, max_payload)
        .await
        .context("Failed to read transfer frame")?;

    let file_name = sanitize_file_name(&message.file_name);
    if file_name != message.file_name {
        tracing::warn!(
            "Sanitized incoming file name {:?} to {:?}",
            message.file_name,
            file_name
        );
    }
    let size = message.payload.len() as u64;
    tracing::info!("Receiving: {} ({} bytes)", file_name, size);

    tokio::fs::create_dir_all(download_dir)
        .await
        .with_context(|| format!("Failed to create {}", download_dir.display()))?;

    let file_path = download_dir.join(&file_name);
    tokio::fs::write(&file_path, &message.payload)
        .await
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    stream.write_all(ACK_SUCCESS).await?;
    stream.flush().await?;

    let _ = event_tx
        .send(AppEvent::AssetReceived {
            file_name,
            size,
            saved_path: file_path.clone(),
        })
        .await;

    Ok(file_path)
}
