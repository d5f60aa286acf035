//! Standalone headset emulator
//!
//! Run with: cargo run --bin headset_emulator
//!
//! Answers discovery broadcasts for its pairing code and stores received
//! assets in the download directory. Ports, download directory and an
//! optional fixed pairing code come from the `device` section of config.json.

use anyhow::{Context, Result};
use headset_core::pairing::generate_pairing_code;
use headset_core::transfer::run_server;
use headset_core::{AppConfig, AppEvent, DiscoveryResponder, PairingCode};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().device;
    let code = match &config.pairing_code {
        Some(code) => PairingCode::parse(code)
            .with_context(|| format!("Invalid pairing code in config: {:?}", code))?,
        None => generate_pairing_code(),
    };

    let responder = DiscoveryResponder::bind(config.discovery_port, code.clone())
        .await
        .with_context(|| format!("Cant bind discovery port {}", config.discovery_port))?;
    let listener = TcpListener::bind(("0.0.0.0", config.transfer_port))
        .await
        .with_context(|| format!("Cant bind transfer port {}", config.transfer_port))?;

    let local_ip = local_ip_address::local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    println!("Headset emulator");
    println!("  Pairing code : {}", code);
    println!("  Address      : {}", local_ip);
    println!("  Discovery    : udp/{}", config.discovery_port);
    println!("  Transfer     : tcp/{}", config.transfer_port);
    println!("  Downloads    : {}", config.download_path.display());
    println!();

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(100);
    let cancel = CancellationToken::new();

    tokio::spawn(responder.run(event_tx.clone(), cancel.clone()));
    tokio::spawn(run_server(
        listener,
        config.download_path.clone(),
        config.max_payload_size,
        event_tx,
        cancel.clone(),
    ));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                cancel.cancel();
                break;
            }
            Some(event) = event_rx.recv() => match event {
                AppEvent::DiscoveryAnswered { from } => {
                    println!("Paired with {}", from.ip());
                }
                AppEvent::AssetReceived { file_name, size, saved_path } => {
                    println!("Received {} ({} bytes) -> {}", file_name, size, saved_path.display());
                }
                AppEvent::Error(e) => eprintln!("{}", e),
                _ => {}
            },
        }
    }

    Ok(())
}
