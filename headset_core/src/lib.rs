//! Send an exported 3D asset to a headset on the local network.
//!
//! A transfer resolves a 4-character pairing code to an address with a UDP
//! broadcast ([`discovery`]), then streams one length-prefixed frame over TCP
//! ([`protocol`], [`transfer`]) and waits for a single acknowledgment. The
//! [`orchestrator`] ties the steps together off the caller's thread.
//!
//! The headset side of both protocols is included for the emulator binary
//! and for tests.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub mod config;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod pairing;
pub mod protocol;
pub mod transfer;

pub use config::{AppConfig, DeviceConfig, TransferConfig};
pub use discovery::{DiscoveryResponder, Resolver};
pub use error::{DiscoveryError, EncodingError, FrameError, TransferError, ValidationError};
pub use orchestrator::{Orchestrator, Selection, TransferHandle, TransferReport, TransferRequest};
pub use pairing::PairingCode;
pub use protocol::{TransferMessage, TransferOutcome};

/// Events reported from the core to the host UI
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Discovery resolved the pairing code
    DeviceFound {
        ip: IpAddr,
    },

    TransferCompleted {
        file_name: String,
        address: IpAddr,
        message: String,
    },
    Error(String),

    /// Headset side: a matching discovery request was answered
    DiscoveryAnswered {
        from: SocketAddr,
    },

    /// Headset side: an asset was stored
    AssetReceived {
        file_name: String,
        size: u64,
        saved_path: PathBuf,
    },
}
