//! Error types for every stage of a transfer attempt.

use std::io;
use thiserror::Error;

/// Rejections reported synchronously, before any socket is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Connection code must be 4 characters.")]
    InvalidPairingCode,
    #[error("No objects selected.")]
    EmptySelection,
    #[error("Active object is not among the selected objects.")]
    PrimaryNotSelected,
    #[error("No duplicates created for export.")]
    EmptyPayload,
    #[error("A transfer is already in progress.")]
    TransferInProgress,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Could not discover headset on the network.")]
    Timeout,
    #[error("Discovery failed: {0}")]
    NetworkError(#[source] io::Error),
    #[error("Discovery cancelled.")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("file name is empty")]
    EmptyFileName,
    #[error("file name is {0} bytes, too long for a 32-bit length prefix")]
    FileNameTooLong(usize),
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("connection failed: {0}")]
    ConnectFailed(#[source] io::Error),
    #[error("send failed: {0}")]
    SendFailed(#[source] io::Error),
    #[error("timed out waiting for acknowledgment")]
    AckTimeout,
    #[error("no acknowledgment")]
    NoAcknowledgment,
    #[error("failed to read acknowledgment: {0}")]
    AckReadFailed(#[source] io::Error),
    #[error("unexpected acknowledgment")]
    AckMismatch,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("transfer cancelled")]
    Cancelled,
    #[error("transfer worker stopped: {0}")]
    WorkerStopped(String),
}

/// Errors raised while decoding a framed transfer message.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("truncated frame: {field} needs {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: u64,
        available: u64,
    },
    #[error("file name is not valid UTF-8")]
    InvalidFileName,
    #[error("file name too long ({0} bytes)")]
    FileNameTooLong(u32),
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: u64, max: u64 },
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}
