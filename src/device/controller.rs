use std::fmt;
use std::io::Write;

use super::{Exchange, Result};
use crate::config::MuxConfiguration;
use crate::serial::{
    encode_configuration, DeviceReply, LinkSettings, PortOpener, SerialPortOpener, Session,
};

/// Sends MUX configurations to a single device.
///
/// Every call is one blocking request/response over a freshly opened
/// port. Calls must not overlap: two controllers pointed at the same
/// device would interleave on the wire.
pub struct MuxController<O: PortOpener = SerialPortOpener> {
    opener: O,
    settings: LinkSettings,
}

impl MuxController<SerialPortOpener> {
    pub fn new(settings: LinkSettings) -> Self {
        Self::with_opener(SerialPortOpener, settings)
    }
}

impl<O: PortOpener> MuxController<O> {
    pub fn with_opener(opener: O, settings: LinkSettings) -> Self {
        Self { opener, settings }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Validate `pairs` and, if they pass, run one exchange with the device
    pub fn send_configuration(&self, pairs: &[(i32, i32)]) -> Result<Exchange> {
        self.validate_and_send(pairs, |_| {})
    }

    /// Send an already validated configuration
    pub fn apply(&self, config: &MuxConfiguration) -> Result<Exchange> {
        self.transmit(config, |_| {})
    }

    /// Caller-facing operation: validate, send, and write human-readable
    /// status lines to `out`. Errors are reported, never returned.
    pub fn set_mux_configuration<W: Write>(&self, pairs: &[(i32, i32)], out: &mut W) {
        let result = self.validate_and_send(pairs, |line| {
            report(out, format_args!("Sent configuration: {}", line));
        });

        match result {
            Ok(exchange) => report(out, format_args!("Response: {}", exchange.response)),
            Err(e) => report(out, format_args!("Error: {}", e)),
        }
    }

    fn validate_and_send(
        &self,
        pairs: &[(i32, i32)],
        on_sent: impl FnOnce(&str),
    ) -> Result<Exchange> {
        let config = MuxConfiguration::from_pairs(pairs).map_err(|e| {
            log::warn!("Rejected configuration before sending: {}", e);
            e
        })?;
        self.transmit(&config, on_sent)
    }

    fn transmit(&self, config: &MuxConfiguration, on_sent: impl FnOnce(&str)) -> Result<Exchange> {
        if let Some(pin) = config.shared_pin() {
            log::warn!(
                "Pin {} is assigned multiple times; the device will refuse this configuration",
                pin
            );
        }

        let payload = encode_configuration(config);

        let mut session = Session::open(&self.opener, &self.settings)?;
        session.send(payload.as_bytes())?;
        on_sent(payload.trim_end_matches('\n'));

        let response = session.read_available()?;
        drop(session);

        let exchange = Exchange::new(payload, response);
        match &exchange.reply {
            DeviceReply::Reconfigured { pin_map } => {
                log::info!("Device applied configuration ({} mappings echoed)", pin_map.len());
            }
            DeviceReply::Rejected { reason } => {
                log::warn!("Device rejected configuration: {}", reason)
            }
            DeviceReply::Silent => {
                log::warn!("No response within {:?}", self.settings.settle_delay)
            }
            DeviceReply::Unrecognized { text } => {
                log::warn!("Unrecognized device response: {:?}", text)
            }
        }

        Ok(exchange)
    }
}

fn report<W: Write>(out: &mut W, message: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", message) {
        log::warn!("Failed to write status output: {}", e);
    }
}
