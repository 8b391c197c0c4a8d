pub mod controller;
pub mod models;

pub use controller::MuxController;
pub use models::*;


#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0}")]
    InvalidConfiguration(#[from] crate::config::ConfigError),

    #[error("{0}")]
    SerialError(#[from] crate::serial::SerialError),
}

impl DeviceError {
    /// True when nothing reached the transport
    pub fn is_validation(&self) -> bool {
        matches!(self, DeviceError::InvalidConfiguration(_))
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
