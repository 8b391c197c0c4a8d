use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

// Constants from firmware
pub const MAPPING_COUNT: usize = 8; // MUX_PIN_GROUPS * MUX_GROUP_SIZE
pub const PIN_MIN: i32 = 0;
pub const PIN_MAX: i32 = 30;

const MUX_GROUP_SIZE: u8 = 4;
const MUX_GROUP_0_IN_START: u8 = 2;
const MUX_GROUP_0_OUT_START: u8 = 6;
const MUX_GROUP_1_IN_START: u8 = 10;
const MUX_GROUP_1_OUT_START: u8 = 14;

/// One routing entry: the signal on `input_pin` is mirrored onto `output_pin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMapping {
    pub input_pin: u8,
    pub output_pin: u8,
}

impl PinMapping {
    pub fn as_pair(&self) -> (i32, i32) {
        (self.input_pin as i32, self.output_pin as i32)
    }
}

/// A complete, validated MUX configuration.
///
/// Only constructible through [`MuxConfiguration::from_pairs`] (or the
/// firmware defaults), so holding one means every rule has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MuxConfiguration {
    mappings: [PinMapping; MAPPING_COUNT],
}

impl MuxConfiguration {
    /// Validate caller-supplied pairs.
    ///
    /// Rules are checked in order and the first failure wins: the entry
    /// count, then per pair the pin range, then input != output.
    pub fn from_pairs(pairs: &[(i32, i32)]) -> Result<Self> {
        if pairs.len() != MAPPING_COUNT {
            return Err(ConfigError::CountMismatch { found: pairs.len() });
        }

        let mut mappings = [PinMapping { input_pin: 0, output_pin: 0 }; MAPPING_COUNT];

        for (index, &(input, output)) in pairs.iter().enumerate() {
            if !pin_in_range(input) || !pin_in_range(output) {
                return Err(ConfigError::PinOutOfRange { index, input, output });
            }
            if input == output {
                return Err(ConfigError::SelfMapping { index, input, output });
            }
            mappings[index] = PinMapping {
                input_pin: input as u8,
                output_pin: output as u8,
            };
        }

        Ok(Self { mappings })
    }

    /// The routing the firmware boots with
    pub fn firmware_default() -> Self {
        let mut mappings = [PinMapping { input_pin: 0, output_pin: 0 }; MAPPING_COUNT];
        for i in 0..MUX_GROUP_SIZE {
            mappings[i as usize] = PinMapping {
                input_pin: MUX_GROUP_0_IN_START + i,
                output_pin: MUX_GROUP_0_OUT_START + i,
            };
            mappings[(MUX_GROUP_SIZE + i) as usize] = PinMapping {
                input_pin: MUX_GROUP_1_IN_START + i,
                output_pin: MUX_GROUP_1_OUT_START + i,
            };
        }
        Self { mappings }
    }

    pub fn mappings(&self) -> &[PinMapping] {
        &self.mappings
    }

    pub fn pairs(&self) -> Vec<(i32, i32)> {
        self.mappings.iter().map(PinMapping::as_pair).collect()
    }

    /// First pin that appears in more than one position, if any.
    ///
    /// The firmware refuses such a configuration; the host still sends it
    /// and lets the device report the rejection.
    pub fn shared_pin(&self) -> Option<u8> {
        let mut used = [false; PIN_MAX as usize + 1];
        for mapping in &self.mappings {
            for pin in [mapping.input_pin, mapping.output_pin] {
                if used[pin as usize] {
                    return Some(pin);
                }
                used[pin as usize] = true;
            }
        }
        None
    }
}

impl TryFrom<&[(i32, i32)]> for MuxConfiguration {
    type Error = ConfigError;

    fn try_from(pairs: &[(i32, i32)]) -> Result<Self> {
        Self::from_pairs(pairs)
    }
}

impl<'de> Deserialize<'de> for MuxConfiguration {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            mappings: Vec<PinMapping>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let pairs: Vec<(i32, i32)> = raw.mappings.iter().map(PinMapping::as_pair).collect();
        Self::from_pairs(&pairs).map_err(serde::de::Error::custom)
    }
}

fn pin_in_range(pin: i32) -> bool {
    (PIN_MIN..=PIN_MAX).contains(&pin)
}
