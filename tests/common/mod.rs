#![allow(dead_code)]

// In-memory transport for driving MuxController without hardware.

use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::time::Duration;

use pico_mux_lib::serial::{LinkSettings, MuxPort, PortOpener, Result, SerialError};

#[derive(Debug, Default)]
pub struct Wire {
    pub written: Vec<u8>,
    pub response: Vec<u8>,
    pub read_cursor: usize,
    pub opens: usize,
    pub closes: usize,
    pub fail_open: bool,
    pub fail_write: bool,
    pub fail_read: bool,
}

#[derive(Clone, Default)]
pub struct MockOpener {
    pub wire: Rc<RefCell<Wire>>,
}

impl MockOpener {
    pub fn replying(response: &str) -> Self {
        let opener = Self::default();
        opener.wire.borrow_mut().response = response.as_bytes().to_vec();
        opener
    }

    pub fn written(&self) -> String {
        String::from_utf8(self.wire.borrow().written.clone()).expect("payload is ascii")
    }

    pub fn opens(&self) -> usize {
        self.wire.borrow().opens
    }

    pub fn closes(&self) -> usize {
        self.wire.borrow().closes
    }
}

pub struct MockPort {
    wire: Rc<RefCell<Wire>>,
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_read {
            return Err(io::Error::new(io::ErrorKind::Other, "bus fault"));
        }
        let start = wire.read_cursor;
        let n = buf.len().min(wire.response.len() - start);
        buf[..n].copy_from_slice(&wire.response[start..start + n]);
        wire.read_cursor += n;
        Ok(n)
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        wire.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MuxPort for MockPort {
    fn bytes_to_read(&self) -> Result<u32> {
        let wire = self.wire.borrow();
        Ok((wire.response.len() - wire.read_cursor) as u32)
    }
}

impl Drop for MockPort {
    fn drop(&mut self) {
        self.wire.borrow_mut().closes += 1;
    }
}

impl PortOpener for MockOpener {
    type Port = MockPort;

    fn open(&self, settings: &LinkSettings) -> Result<MockPort> {
        let mut wire = self.wire.borrow_mut();
        if wire.fail_open {
            return Err(SerialError::ConnectionFailed(format!(
                "{}: No such file or directory",
                settings.port_name
            )));
        }
        wire.opens += 1;
        Ok(MockPort { wire: self.wire.clone() })
    }
}

pub fn test_settings() -> LinkSettings {
    LinkSettings {
        settle_delay: Duration::ZERO,
        ..LinkSettings::default()
    }
}

pub const EXAMPLE: [(i32, i32); 8] = [
    (6, 2), (3, 7), (4, 8), (5, 9), (10, 14), (11, 15), (12, 16), (17, 13),
];

pub const EXAMPLE_LINE: &str = "[(6,2),(3,7),(4,8),(5,9),(10,14),(11,15),(12,16),(17,13)]\n";

pub const DEVICE_OK: &str = "MUX reconfigured successfully\npin_map:[\n    (6, 2),\n    (3, 7),\n    (4, 8),\n    (5, 9),\n    (10, 14),\n    (11, 15),\n    (12, 16),\n    (17, 13),\n]\n";
