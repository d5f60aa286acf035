/// Default TCP port the headset accepts assets on
pub const TRANSFER_PORT: u16 = 5000;

/// Upper bound for the single acknowledgment read
pub const ACK_BUFFER_SIZE: usize = 1024;

/// Maximum file name length accepted by the receiver
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Default cap on a received payload (2 GiB)
pub const MAX_PAYLOAD_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Extension appended to exported asset names
pub const EXPORT_EXTENSION: &str = "glb";
