//! Transfer client behavior against scripted TCP peers.

use headset_core::protocol::{encode, read_message};
use headset_core::transfer::TransferClient;
use headset_core::{TransferError, TransferOutcome};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn client(port: u16, io_timeout: Duration) -> TransferClient {
    TransferClient {
        port,
        connect_timeout: Duration::from_secs(2),
        io_timeout,
    }
}

/// Peer that reads one frame and answers with `ack`, or holds the
/// connection open for `hold` when `ack` is `None`
async fn scripted_peer(ack: Option<&'static [u8]>, hold: Duration) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let message = read_message(&mut stream, 1024 * 1024).await.unwrap();
        assert_eq!(message.file_name, "Chair.glb");
        match ack {
            Some(ack) => {
                stream.write_all(ack).await.unwrap();
            }
            None => tokio::time::sleep(hold).await,
        }
    });

    port
}

#[tokio::test]
async fn test_send_success() {
    let port = scripted_peer(Some(&b"Success"[..]), Duration::ZERO).await;
    let frame = encode("Chair.glb", b"0123456789").unwrap();

    let outcome = client(port, Duration::from_secs(2))
        .send(&frame, LOCALHOST, &CancellationToken::new())
        .await;

    assert!(outcome.is_success(), "got {:?}", outcome);
}

#[tokio::test]
async fn test_send_ack_mismatch() {
    let port = scripted_peer(Some(&b"Error"[..]), Duration::ZERO).await;
    let frame = encode("Chair.glb", b"0123456789").unwrap();

    let outcome = client(port, Duration::from_secs(2))
        .send(&frame, LOCALHOST, &CancellationToken::new())
        .await;

    assert!(matches!(
        outcome,
        TransferOutcome::Failure(TransferError::AckMismatch)
    ));
}

#[tokio::test]
async fn test_send_ack_timeout() {
    // Peer accepts the whole frame but never answers
    let port = scripted_peer(None, Duration::from_secs(3)).await;
    let frame = encode("Chair.glb", b"0123456789").unwrap();

    let outcome = client(port, Duration::from_millis(300))
        .send(&frame, LOCALHOST, &CancellationToken::new())
        .await;

    assert!(
        matches!(outcome, TransferOutcome::Failure(TransferError::AckTimeout)),
        "got {:?}",
        outcome
    );
}

#[tokio::test]
async fn test_send_closed_without_ack() {
    // Peer reads the frame and hangs up without a word
    let port = scripted_peer(None, Duration::ZERO).await;
    let frame = encode("Chair.glb", b"0123456789").unwrap();

    let outcome = client(port, Duration::from_secs(2))
        .send(&frame, LOCALHOST, &CancellationToken::new())
        .await;

    assert!(
        matches!(
            outcome,
            TransferOutcome::Failure(TransferError::NoAcknowledgment)
        ),
        "got {:?}",
        outcome
    );
}

#[tokio::test]
async fn test_send_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let frame = encode("Chair.glb", b"0123456789").unwrap();
    let outcome = client(port, Duration::from_secs(2))
        .send(&frame, LOCALHOST, &CancellationToken::new())
        .await;

    match outcome {
        TransferOutcome::Failure(TransferError::ConnectFailed(e)) => {
            assert!(!e.to_string().is_empty());
        }
        other => panic!("Expected ConnectFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_cancelled_while_waiting_for_ack() {
    let port = scripted_peer(None, Duration::from_secs(5)).await;
    let frame = encode("Chair.glb", b"0123456789").unwrap();

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let outcome = timeout(
        Duration::from_secs(2),
        client(port, Duration::from_secs(10)).send(&frame, LOCALHOST, &cancel),
    )
    .await
    .expect("Cancellation should stop the transfer");

    assert!(matches!(
        outcome,
        TransferOutcome::Failure(TransferError::Cancelled)
    ));
}
