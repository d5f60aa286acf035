//! Wire formats for discovery and file transfer.
//!
//! Transfer frame, all integers big-endian:
//!
//! ```text
//! | name length: u32 | name: [u8; name length] | payload length: u64 | payload |
//! ```
//!
//! The receiver answers with the bytes `Success`; anything else is a failure.
//! Discovery requests are the raw code bytes, responses the fixed text
//! [`DISCOVERY_RESPONSE`].

use crate::error::{EncodingError, FrameError, TransferError};
use crate::pairing::PairingCode;
use crate::transfer::constants::MAX_FILENAME_LENGTH;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Reply sent by a headset whose code matched the broadcast
pub const DISCOVERY_RESPONSE: &[u8] = b"Headset-Discovery-Response";

/// Acknowledgment for a stored asset
pub const ACK_SUCCESS: &[u8] = b"Success";

/// Acknowledgment sent by the receiver when a frame could not be stored
pub const ACK_ERROR: &[u8] = b"Error";

const NAME_LENGTH_SIZE: usize = 4;
const PAYLOAD_LENGTH_SIZE: usize = 8;

/// Outcome of a single transfer attempt
#[derive(Debug)]
pub enum TransferOutcome {
    Success,
    Failure(TransferError),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }

    pub fn into_result(self) -> Result<(), TransferError> {
        match self {
            TransferOutcome::Success => Ok(()),
            TransferOutcome::Failure(e) => Err(e),
        }
    }
}

impl From<Result<(), TransferError>> for TransferOutcome {
    fn from(result: Result<(), TransferError>) -> Self {
        match result {
            Ok(()) => TransferOutcome::Success,
            Err(e) => TransferOutcome::Failure(e),
        }
    }
}

/// A decoded transfer frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMessage {
    pub file_name: String,
    pub payload: Bytes,
}

impl TransferMessage {
    pub fn new(file_name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            payload: payload.into(),
        }
    }

    pub fn encode(&self) -> Result<Bytes, EncodingError> {
        encode(&self.file_name, &self.payload)
    }
}

/// Serialize a file name and payload into one transfer frame
pub fn encode(file_name: &str, payload: &[u8]) -> Result<Bytes, EncodingError> {
    if file_name.is_empty() {
        return Err(EncodingError::EmptyFileName);
    }
    let name_len = u32::try_from(file_name.len())
        .map_err(|_| EncodingError::FileNameTooLong(file_name.len()))?;

    let mut buf = BytesMut::with_capacity(
        NAME_LENGTH_SIZE + file_name.len() + PAYLOAD_LENGTH_SIZE + payload.len(),
    );
    buf.put_u32(name_len);
    buf.put_slice(file_name.as_bytes());
    buf.put_u64(payload.len() as u64);
    buf.put_slice(payload);

    Ok(buf.freeze())
}

/// Parse a complete transfer frame held in memory
pub fn decode(bytes: &[u8]) -> Result<TransferMessage, FrameError> {
    let mut buf = bytes;

    ensure_available(buf, NAME_LENGTH_SIZE as u64, "name length")?;
    let name_len = buf.get_u32();

    ensure_available(buf, u64::from(name_len), "file name")?;
    let name_len = name_len as usize;
    let file_name = std::str::from_utf8(&buf[..name_len])
        .map_err(|_| FrameError::InvalidFileName)?
        .to_string();
    buf.advance(name_len);

    ensure_available(buf, PAYLOAD_LENGTH_SIZE as u64, "payload length")?;
    let payload_len = buf.get_u64();

    ensure_available(buf, payload_len, "payload")?;
    let payload_len = payload_len as usize;
    let payload = Bytes::copy_from_slice(&buf[..payload_len]);
    buf.advance(payload_len);

    if buf.has_remaining() {
        return Err(FrameError::TrailingBytes(buf.remaining()));
    }

    Ok(TransferMessage { file_name, payload })
}

fn ensure_available(buf: &[u8], needed: u64, field: &'static str) -> Result<(), FrameError> {
    let available = buf.len() as u64;
    if available < needed {
        return Err(FrameError::Truncated {
            field,
            needed,
            available,
        });
    }
    Ok(())
}

/// Read one transfer frame from a stream.
///
/// Length prefixes are checked against the limits before any buffer is
/// allocated for the name. The payload buffer is filled as data arrives, so a
/// peer that declares a large payload and stalls costs no more memory than
/// it has sent.
pub async fn read_message<R>(reader: &mut R, max_payload: u64) -> Result<TransferMessage, FrameError>
where
    R: AsyncRead + Unpin,
{
    let name_len = reader.read_u32().await?;
    if name_len as usize > MAX_FILENAME_LENGTH {
        return Err(FrameError::FileNameTooLong(name_len));
    }

    let mut name_buf = vec![0u8; name_len as usize];
    reader.read_exact(&mut name_buf).await?;
    let file_name = String::from_utf8(name_buf).map_err(|_| FrameError::InvalidFileName)?;

    let payload_len = reader.read_u64().await?;
    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    // Grows with the bytes that actually arrive, not with the declared length
    let mut payload = Vec::new();
    let received = reader.take(payload_len).read_to_end(&mut payload).await? as u64;
    if received < payload_len {
        return Err(FrameError::Truncated {
            field: "payload",
            needed: payload_len,
            available: received,
        });
    }

    Ok(TransferMessage {
        file_name,
        payload: Bytes::from(payload),
    })
}

/// Interpret the receiver's acknowledgment
pub fn decode_ack(bytes: &[u8]) -> TransferOutcome {
    if bytes == ACK_SUCCESS {
        TransferOutcome::Success
    } else {
        TransferOutcome::Failure(TransferError::AckMismatch)
    }
}

/// Build the discovery broadcast for a pairing code
pub fn discovery_request(code: &PairingCode) -> Bytes {
    Bytes::copy_from_slice(code.as_bytes())
}

pub fn is_discovery_response(payload: &[u8]) -> bool {
    payload == DISCOVERY_RESPONSE
}
