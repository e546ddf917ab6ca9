use crate::frame::Frame;
use crate::transport::Transport;
use embedded_io::{ErrorKind, ErrorType};
use std::collections::VecDeque;
use std::time::Duration;

/// Records everything written and plays back canned response bytes.
///
/// Scripted bytes stay with the pretend servo until a request is flushed, which releases as many
/// of them as that request's register is wide. Bytes passed to `arrive` show up on the line
/// immediately.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub written: Vec<u8>,
    pub flushes: usize,
    pub reads: usize,
    pub discards: usize,
    pub last_timeout: Option<Duration>,
    /// Fail every call with this error, if set.
    pub error: Option<ErrorKind>,
    script: VecDeque<u8>,
    line: VecDeque<u8>,
    request_start: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.respond(bytes);
        transport
    }

    /// Queues bytes for the servo to send back in answer to later requests.
    pub fn respond(&mut self, bytes: &[u8]) {
        self.script.extend(bytes);
    }

    /// Puts bytes straight on the line, as if an earlier answer turned up late.
    pub fn arrive(&mut self, bytes: &[u8]) {
        self.line.extend(bytes);
    }

    /// True if nothing at all has been asked of the transport.
    pub fn untouched(&self) -> bool {
        self.written.is_empty() && self.flushes == 0 && self.reads == 0 && self.discards == 0
    }

    fn check(&self) -> Result<(), ErrorKind> {
        self.error.map_or(Ok(()), Err)
    }
}

impl ErrorType for MockTransport {
    type Error = ErrorKind;
}

impl Transport for MockTransport {
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.discards += 1;
        self.line.clear();
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.check()?;
        self.written.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.flushes += 1;
        if let Ok(frame) = Frame::parse(&self.written[self.request_start..]) {
            let count = frame.register.spec().width.bytes().min(self.script.len());
            self.line.extend(self.script.drain(..count));
        }
        self.request_start = self.written.len();
        Ok(())
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        self.check()?;
        self.reads += 1;
        self.last_timeout = Some(timeout);
        let count = buf.len().min(self.line.len());
        for (byte, response) in buf.iter_mut().zip(self.line.drain(..count)) {
            *byte = response;
        }
        Ok(count)
    }
}
