pub mod interface;
pub mod protocol;

pub use interface::{MuxPort, PortOpener, SerialPortOpener, Session};
pub use protocol::{decode_configuration, encode_configuration, DeviceReply};

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Pico USB CDC defaults
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";
pub const BAUD_RATE: u32 = 115200;
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Transport parameters for one exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    /// Pause between writing the payload and draining the reply
    pub settle_delay: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            port_name: DEFAULT_PORT.to_string(),
            baud_rate: BAUD_RATE,
            read_timeout: READ_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

impl LinkSettings {
    pub fn with_port(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialport error: {0}")]
    SerialportError(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, SerialError>;
