pub mod mapping;

pub use mapping::{MuxConfiguration, PinMapping, MAPPING_COUNT, PIN_MAX, PIN_MIN};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration must have exactly {} pin mappings.", MAPPING_COUNT)]
    CountMismatch { found: usize },

    #[error(
        "Pin numbers must be between {} and {}. Invalid pair: ({input}, {output})",
        PIN_MIN,
        PIN_MAX
    )]
    PinOutOfRange { index: usize, input: i32, output: i32 },

    #[error("Input and output pins cannot be the same. Invalid pair: ({input}, {output})")]
    SelfMapping { index: usize, input: i32, output: i32 },
}

impl ConfigError {
    /// The offending pair, for rules that single one out
    pub fn pair(&self) -> Option<(i32, i32)> {
        match self {
            ConfigError::CountMismatch { .. } => None,
            ConfigError::PinOutOfRange { input, output, .. }
            | ConfigError::SelfMapping { input, output, .. } => Some((*input, *output)),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
