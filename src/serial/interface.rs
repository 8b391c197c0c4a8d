use std::io::{Read, Write};
use std::thread;

use serialport::SerialPort;

use super::{LinkSettings, Result, SerialError};

/// The operations one exchange needs from an open port
pub trait MuxPort: Read + Write {
    /// Bytes already buffered by the driver and readable without blocking
    fn bytes_to_read(&self) -> Result<u32>;
}

impl MuxPort for Box<dyn SerialPort> {
    fn bytes_to_read(&self) -> Result<u32> {
        SerialPort::bytes_to_read(self.as_ref()).map_err(SerialError::SerialportError)
    }
}

/// Opens the transport for a session
pub trait PortOpener {
    type Port: MuxPort;

    fn open(&self, settings: &LinkSettings) -> Result<Self::Port>;
}

/// Opens real serial devices through the `serialport` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPortOpener;

impl PortOpener for SerialPortOpener {
    type Port = Box<dyn SerialPort>;

    fn open(&self, settings: &LinkSettings) -> Result<Self::Port> {
        serialport::new(settings.port_name.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| SerialError::ConnectionFailed(format!("{}: {}", settings.port_name, e)))
    }
}

/// Exclusive ownership of an open port for a single request/response.
///
/// The port is closed when the session is dropped, whichever way the
/// exchange ends.
pub struct Session<P: MuxPort> {
    port: P,
    settings: LinkSettings,
}

impl<P: MuxPort> Session<P> {
    pub fn open<O>(opener: &O, settings: &LinkSettings) -> Result<Self>
    where
        O: PortOpener<Port = P>,
    {
        let port = opener.open(settings)?;
        log::info!("Opened {} at {} baud", settings.port_name, settings.baud_rate);
        Ok(Self {
            port,
            settings: settings.clone(),
        })
    }

    /// Write the whole payload and flush it to the device
    pub fn send(&mut self, payload: &[u8]) -> Result<usize> {
        self.port.write_all(payload)?;
        self.port.flush()?;
        log::debug!("Wrote {} bytes to {}", payload.len(), self.settings.port_name);
        Ok(payload.len())
    }

    /// Wait the settle delay, then drain whatever the device has sent.
    ///
    /// There is no response framing: a reply that arrives after the settle
    /// window, or in several chunks, may come back truncated.
    pub fn read_available(&mut self) -> Result<String> {
        thread::sleep(self.settings.settle_delay);

        let available = self.port.bytes_to_read()? as usize;
        let mut buffer = vec![0u8; available];
        let mut total_read = 0;

        while total_read < available {
            match self.port.read(&mut buffer[total_read..]) {
                Ok(0) => break,
                Ok(bytes_read) => total_read += bytes_read,
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(SerialError::IoError(e)),
            }
        }

        log::debug!("Read {} of {} available bytes", total_read, available);
        Ok(String::from_utf8_lossy(&buffer[..total_read]).into_owned())
    }
}

impl<P: MuxPort> Drop for Session<P> {
    fn drop(&mut self) {
        log::info!("Closing {}", self.settings.port_name);
    }
}
