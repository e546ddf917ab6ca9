use core::time::Duration;
use embedded_io::ErrorType;

/// A byte stream to the servo.
///
/// Adapters for the platform's serial port are supplied by the application. With the `std` feature
/// enabled, [`SerialPortTransport`] wraps anything from the `serialport` crate.
pub trait Transport: ErrorType {
    /// Drops anything already received but not yet read, such as the tail of a late answer to an
    /// earlier request.
    fn discard_input(&mut self) -> Result<(), Self::Error>;

    /// Queues `buf` for transmission.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Blocks until everything queued has left the wire.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Reads into `buf` until it is full or `timeout` elapses, and returns how many bytes arrived.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        (**self).discard_input()
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        (**self).read_timeout(buf, timeout)
    }
}

#[cfg(feature = "std")]
pub use serial::{SerialPortTransport, DEFAULT_BAUD_RATE};

#[cfg(feature = "std")]
mod serial {
    use super::Transport;
    use log::trace;
    use serialport::{ClearBuffer, SerialPort};
    use std::io::{self, ErrorKind, Read, Write};
    use std::time::{Duration, Instant};

    pub const DEFAULT_BAUD_RATE: u32 = 115_200;

    /// A [`Transport`] over a serial port from the `serialport` crate.
    pub struct SerialPortTransport {
        port: Box<dyn SerialPort>,
    }

    impl SerialPortTransport {
        pub fn new(port: Box<dyn SerialPort>) -> Self {
            Self { port }
        }

        /// Opens the serial port at `path` with the given baud rate, 8N1.
        pub fn open(path: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
            let port = serialport::new(path, baud_rate).open()?;
            Ok(Self::new(port))
        }

        pub fn into_inner(self) -> Box<dyn SerialPort> {
            self.port
        }
    }

    impl embedded_io::ErrorType for SerialPortTransport {
        type Error = io::Error;
    }

    impl Transport for SerialPortTransport {
        fn discard_input(&mut self) -> Result<(), Self::Error> {
            Ok(self.port.clear(ClearBuffer::Input)?)
        }

        fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.port.write_all(buf)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Write::flush(&mut self.port)
        }

        fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
            let deadline = Instant::now() + timeout;
            let mut received = 0;
            // Always try at least once, so a zero timeout still picks up bytes already waiting.
            while received < buf.len() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                self.port.set_timeout(remaining)?;
                match self.port.read(&mut buf[received..]) {
                    Ok(0) => break,
                    Ok(n) => received += n,
                    Err(e) if e.kind() == ErrorKind::TimedOut => break,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
                if remaining.is_zero() {
                    break;
                }
            }
            trace!("Read {} of {} bytes", received, buf.len());
            Ok(received)
        }
    }
}
