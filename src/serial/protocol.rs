//! Text protocol spoken by the Pico MUX firmware.
//!
//! Host to device is a single line `[(i,o),(i,o),...]\n`. The device
//! answers with free-form status text (see [`DeviceReply`]).

use serde::{Deserialize, Serialize};

use super::{Result, SerialError};
use crate::config::{MuxConfiguration, MAPPING_COUNT};

/// Size of the firmware's line buffer, excluding the terminator
pub const DEVICE_LINE_CAPACITY: usize = 100;

/// Longest possible payload: two-digit pins everywhere
pub const MAX_PAYLOAD_LEN: usize = 2 + MAPPING_COUNT * "(30,29)".len() + (MAPPING_COUNT - 1) + 1;

const _: () = assert!(MAX_PAYLOAD_LEN <= DEVICE_LINE_CAPACITY);

const RECONFIGURED_MARKER: &str = "MUX reconfigured successfully";
const PIN_MAP_HEADER: &str = "pin_map:[";
const READY_BANNER: &str = "Ready to accept MUX configuration";

/// Encode a validated configuration as the newline-terminated wire line
pub fn encode_configuration(config: &MuxConfiguration) -> String {
    let pairs: Vec<String> = config
        .mappings()
        .iter()
        .map(|m| format!("({},{})", m.input_pin, m.output_pin))
        .collect();
    format!("[{}]\n", pairs.join(","))
}

/// Parse a wire line back into raw pairs.
///
/// Strict inverse of [`encode_configuration`]: no whitespace, decimal
/// integers, one trailing newline allowed. The pairs are not validated.
pub fn decode_configuration(line: &str) -> Result<Vec<(i32, i32)>> {
    let body = line.strip_suffix('\n').unwrap_or(line);
    let inner = body
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| SerialError::ProtocolError(format!("Invalid input format: {:?}", line)))?;

    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let inner = inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| SerialError::ProtocolError(format!("Invalid pair list: {:?}", inner)))?;

    inner
        .split("),(")
        .map(|pair| {
            let (input, output) = pair
                .split_once(',')
                .ok_or_else(|| SerialError::ProtocolError(format!("Invalid pair: ({})", pair)))?;
            Ok((parse_pin(input)?, parse_pin(output)?))
        })
        .collect()
}

// Decimal, no sign, no leading zeros: exactly what the encoder emits for a u8
fn parse_pin(token: &str) -> Result<i32> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && !(token.len() > 1 && token.starts_with('0'));
    if !canonical {
        return Err(SerialError::ProtocolError(format!("Invalid pin: {:?}", token)));
    }
    token
        .parse()
        .map_err(|_| SerialError::ProtocolError(format!("Invalid pin: {:?}", token)))
}

/// What the firmware said after a configuration line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceReply {
    /// Applied; carries the routing table the device printed back
    Reconfigured { pin_map: Vec<(u8, u8)> },
    /// The firmware refused the line
    Rejected { reason: String },
    /// Nothing arrived within the settle window
    Silent,
    Unrecognized { text: String },
}

impl DeviceReply {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != READY_BANNER)
            .collect();

        if lines.is_empty() {
            return DeviceReply::Silent;
        }

        // The firmware may print a stale "Error: Input timeout" before handling
        // our line, so only the last status line counts.
        let last_status = lines
            .iter()
            .rposition(|l| l.starts_with("Error:") || *l == RECONFIGURED_MARKER);

        if let Some(index) = last_status {
            if let Some(reason) = lines[index].strip_prefix("Error:") {
                return DeviceReply::Rejected { reason: reason.trim().to_string() };
            }
            let pin_map = lines[index + 1..]
                .iter()
                .skip_while(|l| **l != PIN_MAP_HEADER)
                .skip(1)
                .take_while(|l| **l != "]")
                .filter_map(|l| parse_dump_entry(l))
                .collect();
            return DeviceReply::Reconfigured { pin_map };
        }

        DeviceReply::Unrecognized { text: text.trim().to_string() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeviceReply::Reconfigured { .. })
    }
}

// Dump entries look like "(6, 2),"
fn parse_dump_entry(line: &str) -> Option<(u8, u8)> {
    let inner = line
        .trim_end_matches(',')
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let (input, output) = inner.split_once(',')?;
    Some((input.trim().parse().ok()?, output.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> MuxConfiguration {
        MuxConfiguration::from_pairs(&[
            (6, 2), (3, 7), (4, 8), (5, 9), (10, 14), (11, 15), (12, 16), (17, 13),
        ])
        .unwrap()
    }

    #[test]
    fn test_encode_example() {
        assert_eq!(
            encode_configuration(&example()),
            "[(6,2),(3,7),(4,8),(5,9),(10,14),(11,15),(12,16),(17,13)]\n"
        );
    }

    #[test]
    fn test_encode_has_no_whitespace_but_the_terminator() {
        let line = encode_configuration(&MuxConfiguration::firmware_default());
        assert!(line.starts_with("[(2,6),") && line.ends_with(",(13,17)]\n"));
        assert_eq!(line.chars().filter(|c| c.is_whitespace()).count(), 1);
    }

    #[test]
    fn test_longest_payload_fits_device_buffer() {
        let config = MuxConfiguration::from_pairs(&[
            (30, 29), (28, 27), (26, 25), (24, 23), (22, 21), (20, 19), (18, 17), (16, 15),
        ])
        .unwrap();
        let line = encode_configuration(&config);
        assert_eq!(line.len(), MAX_PAYLOAD_LEN);
        assert!(line.len() <= DEVICE_LINE_CAPACITY);
    }

    #[test]
    fn test_decode_roundtrip() {
        for config in [example(), MuxConfiguration::firmware_default()] {
            let decoded = decode_configuration(&encode_configuration(&config)).unwrap();
            assert_eq!(decoded, config.pairs());
        }
    }

    #[test]
    fn test_decode_rejects_malformed_lines() {
        for line in [
            "",
            "(1,2)",
            "[(1,2)",
            "[(1, 2)]",
            "[(1,2),(3)]",
            "[(a,2)]",
            "[(1,2)(3,4)]",
            "[(06,2)]",
            "[(-1,2)]",
            "[(6,2),(-0,7)]\n",
            "[(+6,2)]",
        ] {
            assert!(decode_configuration(line).is_err(), "accepted {:?}", line);
        }
        assert_eq!(decode_configuration("[]\n").unwrap(), Vec::new());
    }

    #[test]
    fn test_reply_reconfigured() {
        let text = "MUX reconfigured successfully\npin_map:[\n    (6, 2),\n    (3, 7),\n]\n";
        let reply = DeviceReply::parse(text);
        assert_eq!(reply, DeviceReply::Reconfigured { pin_map: vec![(6, 2), (3, 7)] });
        assert!(reply.is_success());
    }

    #[test]
    fn test_reply_rejected() {
        let reply = DeviceReply::parse("Error: Pin 6 is assigned multiple times\n");
        let reason = "Pin 6 is assigned multiple times".to_string();
        assert_eq!(reply, DeviceReply::Rejected { reason });
        assert!(!reply.is_success());
    }

    #[test]
    fn test_decode_accepts_single_zero() {
        assert_eq!(decode_configuration("[(0,10)]\n").unwrap(), vec![(0, 10)]);
    }

    #[test]
    fn test_reply_stale_timeout_before_success() {
        let text =
            "Error: Input timeout\nMUX reconfigured successfully\npin_map:[\n    (6, 2),\n]\n";
        let reply = DeviceReply::parse(text);
        assert_eq!(reply, DeviceReply::Reconfigured { pin_map: vec![(6, 2)] });
        assert!(reply.is_success());
    }

    #[test]
    fn test_reply_error_after_success_is_rejection() {
        let text =
            "MUX reconfigured successfully\npin_map:[\n    (6, 2),\n]\nError: Input timeout\n";
        assert_eq!(
            DeviceReply::parse(text),
            DeviceReply::Rejected { reason: "Input timeout".into() }
        );
    }

    #[test]
    fn test_reply_silent_and_banner_only() {
        assert_eq!(DeviceReply::parse(""), DeviceReply::Silent);
        assert_eq!(
            DeviceReply::parse("Ready to accept MUX configuration\r\n"),
            DeviceReply::Silent
        );
    }

    #[test]
    fn test_reply_unrecognized() {
        assert_eq!(
            DeviceReply::parse("garbage\n"),
            DeviceReply::Unrecognized { text: "garbage".into() }
        );
    }
}
