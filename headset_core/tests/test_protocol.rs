//! Tests for the transfer frame and acknowledgment encoding.

use headset_core::protocol::{decode, decode_ack, encode};
use headset_core::{EncodingError, FrameError, TransferError, TransferMessage, TransferOutcome};

#[test]
fn test_encode_chair_frame_layout() {
    let payload = b"0123456789";
    let frame = encode("Chair.glb", payload).expect("Should encode");

    // 4 (name length) + 9 (name) + 8 (payload length) + 10 (payload)
    assert_eq!(frame.len(), 31);
    assert_eq!(&frame[..4], &9u32.to_be_bytes());
    assert_eq!(&frame[4..13], b"Chair.glb");
    assert_eq!(&frame[13..21], &10u64.to_be_bytes());
    assert_eq!(&frame[21..], payload);
}

#[test]
fn test_frame_roundtrip() {
    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("Chair.glb", b"glTF binary".to_vec()),
        ("empty.glb", Vec::new()),
        ("椅子.glb", (0..=255u8).cycle().take(70_000).collect()),
    ];

    for (name, payload) in cases {
        let frame = encode(name, &payload).expect("Should encode");
        let decoded = decode(&frame).expect("Should decode");
        assert_eq!(decoded.file_name, name);
        assert_eq!(&decoded.payload[..], &payload[..]);
    }
}

#[test]
fn test_message_encode_matches_free_function() {
    let message = TransferMessage::new("Lamp.glb", vec![1u8, 2, 3]);
    assert_eq!(message.encode().unwrap(), encode("Lamp.glb", &[1, 2, 3]).unwrap());
}

#[test]
fn test_encode_empty_name_fails() {
    assert_eq!(encode("", b"data"), Err(EncodingError::EmptyFileName));
}

#[test]
fn test_decode_rejects_short_payload() {
    let frame = encode("Chair.glb", b"0123456789").unwrap();

    match decode(&frame[..frame.len() - 1]) {
        Err(FrameError::Truncated {
            field,
            needed,
            available,
        }) => {
            assert_eq!(field, "payload");
            assert_eq!(needed, 10);
            assert_eq!(available, 9);
        }
        other => panic!("Expected truncated payload, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_missing_payload_length() {
    let frame = encode("Chair.glb", b"").unwrap();
    assert!(matches!(
        decode(&frame[..15]),
        Err(FrameError::Truncated {
            field: "payload length",
            ..
        })
    ));
}

#[test]
fn test_ack_success() {
    assert!(matches!(decode_ack(b"Success"), TransferOutcome::Success));
}

#[test]
fn test_ack_failures() {
    for ack in [&b""[..], b"Error", b"success", b"Success\n", b"\xff\xfe"] {
        match decode_ack(ack) {
            TransferOutcome::Failure(TransferError::AckMismatch) => {}
            other => panic!("Ack {:?} should fail, got {:?}", ack, other),
        }
    }
}

#[test]
fn test_ack_failure_reason() {
    let outcome = decode_ack(b"Error");
    assert!(!outcome.is_success());
    let err = outcome.into_result().unwrap_err();
    assert_eq!(err.to_string(), "unexpected acknowledgment");
}
