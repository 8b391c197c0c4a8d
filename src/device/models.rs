use serde::{Deserialize, Serialize};

use crate::serial::DeviceReply;

/// Result of one completed configuration exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The wire line that was written, newline included
    pub payload: String,
    /// Raw text drained from the port after the settle delay
    pub response: String,
    pub reply: DeviceReply,
}

impl Exchange {
    pub fn new(payload: String, response: String) -> Self {
        let reply = DeviceReply::parse(&response);
        Self { payload, response, reply }
    }

    /// The payload as shown to the user, without the terminator
    pub fn sent_line(&self) -> &str {
        self.payload.trim_end_matches('\n')
    }
}
