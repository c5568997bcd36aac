//! A concrete [`ByteChannel`](crate::transport::ByteChannel) backed by a real serial port.
//!
//! The core protocol engine only needs the abstract `ByteChannel` trait; this module adds a
//! batteries-included transport over the `serialport` crate so the crate is usable against real
//! hardware without the caller having to write their own adapter, mirroring the way `ethercrab`
//! ships a concrete raw-socket transport alongside its transport-agnostic PDU loop.

use std::io;
use std::time::Duration;

/// A blocking byte channel backed by an RS-232/RS-485 serial port.
///
/// A `read` timeout is reported to the caller as zero bytes read, matching the `ByteChannel`
/// contract (§6): the link layer treats that as end-of-stream and surfaces a [`crate::Error`].
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open `path` (e.g. `/dev/ttyUSB0` or `COM3`) at `baud_rate`, with FT1.2's conventional 8
    /// data bits, one stop bit, no parity.
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> io::Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(io::Error::from)?;

        Ok(Self { port })
    }
}

impl embedded_io::ErrorType for SerialTransport {
    type Error = io::Error;
}

impl embedded_io::Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

impl embedded_io::Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.flush()
    }
}
