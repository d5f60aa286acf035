//! TCP asset transfer.
//!
//! This module provides:
//! - The client that delivers one framed asset and reads its acknowledgment
//! - The headset-side receiver and accept loop
//! - File name helpers for both ends

pub mod constants;
pub mod receiver;
pub mod sender;
pub mod server;
pub mod utils;

// Re-export public API
pub use constants::TRANSFER_PORT;
pub use receiver::receive_asset;
pub use sender::TransferClient;
pub use server::run_server;
