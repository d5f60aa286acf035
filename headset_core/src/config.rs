use crate::discovery::{DISCOVERY_PORT, DISCOVERY_TIMEOUT, LISTEN_PORT};
use crate::transfer::constants::{MAX_PAYLOAD_SIZE, TRANSFER_PORT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "headset";
const APP_NAME: &str = "headset_transfer";
const CONFIG_FILE: &str = "config.json";

/// Settings for the sending side (the content-creation host)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub transfer_port: u16,
    pub discovery_port: u16,
    /// Local port the discovery reply is expected on
    pub listen_port: u16,
    pub broadcast_addr: IpAddr,
    pub discovery_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Bound for writing the frame and for reading the acknowledgment
    pub io_timeout_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            transfer_port: TRANSFER_PORT,
            discovery_port: DISCOVERY_PORT,
            listen_port: LISTEN_PORT,
            broadcast_addr: IpAddr::V4(Ipv4Addr::BROADCAST),
            discovery_timeout_ms: DISCOVERY_TIMEOUT.as_millis() as u64,
            connect_timeout_ms: 30_000,
            io_timeout_ms: 30_000,
        }
    }
}

impl TransferConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

/// Settings for the headset emulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub transfer_port: u16,
    pub discovery_port: u16,
    pub download_path: PathBuf,
    /// Fixed pairing code; a random one is generated when unset
    pub pairing_code: Option<String>,
    pub max_payload_size: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        // ~/headset_transfer on every platform
        let download_path = directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("headset_transfer");

        Self {
            transfer_port: TRANSFER_PORT,
            discovery_port: DISCOVERY_PORT,
            download_path,
            pairing_code: None,
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: TransferConfig,
    pub device: DeviceConfig,
}

impl AppConfig {
    /// Get the config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Ok(test_path) = std::env::var("HEADSET_TEST_CONFIG_DIR") {
            return Some(PathBuf::from(test_path).join(CONFIG_FILE));
        }

        get_config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load config from disk or return default
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Get the config directory path for this app
pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}
