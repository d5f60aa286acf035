//! Runs one discovery-then-transfer attempt per user action.
//!
//! [`Orchestrator::transfer`] validates the request on the caller's thread and
//! returns at once; the network work runs as a task on the tokio runtime. Only
//! one attempt may be in flight per orchestrator.

use crate::AppEvent;
use crate::config::TransferConfig;
use crate::discovery::Resolver;
use crate::error::{DiscoveryError, TransferError, ValidationError};
use crate::pairing::PairingCode;
use crate::protocol;
use crate::transfer::TransferClient;
use crate::transfer::utils::export_file_name;
use bytes::Bytes;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Status for the host to show once [`Orchestrator::transfer`] returns a handle
pub const STARTED_STATUS: &str = "Model transfer started...";

/// The host's current selection
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub items: Vec<String>,
    /// The active item, which names the exported file
    pub primary: Option<String>,
}

impl Selection {
    pub fn new(items: Vec<String>, primary: impl Into<String>) -> Self {
        Self {
            items,
            primary: Some(primary.into()),
        }
    }

    /// Check the selection and derive the export file name from it
    pub fn export_file_name(&self) -> Result<String, ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        match &self.primary {
            Some(primary) if self.items.contains(primary) => Ok(export_file_name(primary)),
            _ => Err(ValidationError::PrimaryNotSelected),
        }
    }
}

/// Everything the host hands over for one transfer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Pairing code as typed by the user
    pub code: String,
    pub selection: Selection,
    /// The exported asset
    pub payload: Bytes,
}

/// Terminal result of one attempt
#[derive(Debug)]
pub enum TransferReport {
    DiscoveryFailed(DiscoveryError),
    TransferSucceeded { address: IpAddr, file_name: String },
    TransferFailed(TransferError),
}

impl TransferReport {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferReport::TransferSucceeded { .. })
    }

    /// Human-readable status for the host UI
    pub fn status_message(&self) -> String {
        match self {
            TransferReport::DiscoveryFailed(e) => e.to_string(),
            TransferReport::TransferSucceeded { address, file_name } => {
                format!("Model {} transferred successfully to {}.", file_name, address)
            }
            TransferReport::TransferFailed(e) => format!("Failed to transfer model: {}", e),
        }
    }
}

/// Handle to a running attempt
#[derive(Debug)]
pub struct TransferHandle {
    cancel: CancellationToken,
    task: JoinHandle<TransferReport>,
}

impl TransferHandle {
    /// Ask the worker to stop at its next blocking point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the terminal report
    pub async fn wait(self) -> TransferReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => TransferReport::TransferFailed(TransferError::WorkerStopped(e.to_string())),
        }
    }
}

pub struct Orchestrator {
    config: TransferConfig,
    runtime: Handle,
    event_tx: mpsc::Sender<AppEvent>,
    in_flight: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(config: TransferConfig, runtime: Handle, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            config,
            runtime,
            event_tx,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Whether an attempt is currently running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate `request` and start the attempt in the background.
    ///
    /// Validation failures are returned before any socket is opened. On
    /// success the returned handle is the acknowledgment that the attempt
    /// has started, not that it has completed. The worker then reports
    /// `DeviceFound` once discovery succeeds and exactly one terminal event,
    /// `TransferCompleted` or `Error`.
    pub fn transfer(&self, request: TransferRequest) -> Result<TransferHandle, ValidationError> {
        let code = PairingCode::parse(&request.code)?;
        let file_name = request.selection.export_file_name()?;
        if request.payload.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Rejected transfer request: another transfer is in progress");
            return Err(ValidationError::TransferInProgress);
        }
        let guard = InFlightGuard(self.in_flight.clone());

        let cancel = CancellationToken::new();
        let job = TransferJob {
            code,
            file_name,
            payload: request.payload,
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
            cancel: cancel.clone(),
        };

        tracing::info!(
            "{} {} ({} bytes)",
            STARTED_STATUS,
            job.file_name,
            job.payload.len()
        );
        let task = self.runtime.spawn(async move {
            let _guard = guard;
            job.run().await
        });

        Ok(TransferHandle { cancel, task })
    }
}

/// Clears the in-flight flag when the worker ends, including on panic or abort
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct TransferJob {
    code: PairingCode,
    file_name: String,
    payload: Bytes,
    config: TransferConfig,
    event_tx: mpsc::Sender<AppEvent>,
    cancel: CancellationToken,
}

impl TransferJob {
    async fn run(self) -> TransferReport {
        let report = self.execute().await;
        let message = report.status_message();

        match &report {
            TransferReport::TransferSucceeded { address, file_name } => {
                tracing::info!("{}", message);
                let _ = self
                    .event_tx
                    .send(AppEvent::TransferCompleted {
                        file_name: file_name.clone(),
                        address: *address,
                        message,
                    })
                    .await;
            }
            _ => {
                tracing::error!("{}", message);
                let _ = self.event_tx.send(AppEvent::Error(message)).await;
            }
        }

        report
    }

    async fn execute(&self) -> TransferReport {
        let resolver = Resolver::from_config(&self.config);
        let address = match resolver.resolve(&self.code, &self.cancel).await {
            Ok(address) => address,
            Err(e) => return TransferReport::DiscoveryFailed(e),
        };
        let _ = self
            .event_tx
            .send(AppEvent::DeviceFound { ip: address })
            .await;

        let frame = match protocol::encode(&self.file_name, &self.payload) {
            Ok(frame) => frame,
            Err(e) => return TransferReport::TransferFailed(e.into()),
        };

        let client = TransferClient::from_config(&self.config);
        match client.send(&frame, address, &self.cancel).await.into_result() {
            Ok(()) => TransferReport::TransferSucceeded {
                address,
                file_name: self.file_name.clone(),
            },
            Err(e) => TransferReport::TransferFailed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selection_derives_file_name() {
        let selection = Selection::new(items(&["Chair", "Table"]), "Chair");
        assert_eq!(selection.export_file_name().unwrap(), "Chair.glb");
    }

    #[test]
    fn test_selection_cleans_primary_name() {
        let selection = Selection::new(items(&["Chair.001"]), "Chair.001");
        assert_eq!(selection.export_file_name().unwrap(), "Chair_001.glb");
    }

    #[test]
    fn test_selection_rejects_empty() {
        let selection = Selection::default();
        assert_eq!(
            selection.export_file_name(),
            Err(ValidationError::EmptySelection)
        );
    }

    #[test]
    fn test_selection_rejects_unselected_primary() {
        let selection = Selection::new(items(&["Chair"]), "Lamp");
        assert_eq!(
            selection.export_file_name(),
            Err(ValidationError::PrimaryNotSelected)
        );

        let no_primary = Selection {
            items: items(&["Chair"]),
            primary: None,
        };
        assert_eq!(
            no_primary.export_file_name(),
            Err(ValidationError::PrimaryNotSelected)
        );
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            TransferReport::DiscoveryFailed(DiscoveryError::Timeout).status_message(),
            "Could not discover headset on the network."
        );
        assert_eq!(
            TransferReport::TransferFailed(TransferError::AckMismatch).status_message(),
            "Failed to transfer model: unexpected acknowledgment"
        );
        let ok = TransferReport::TransferSucceeded {
            address: "192.168.1.42".parse().unwrap(),
            file_name: "Chair.glb".to_string(),
        };
        assert!(ok.is_success());
        assert_eq!(
            ok.status_message(),
            "Model Chair.glb transferred successfully to 192.168.1.42."
        );
    }
}
