use crate::registers::RegisterId;
use embedded_io::ErrorKind;

/// Why a register transaction failed.
#[derive(displaydoc::Display, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// buffer of {provided} bytes is too small for {register}, which needs {needed}
    BufferTooSmall {
        register: RegisterId,
        needed: usize,
        provided: usize,
    },
    /// {0} is read-only
    ReadOnly(RegisterId),
    /// timed out reading {register}: got {received} of {expected} bytes
    TimedOut {
        register: RegisterId,
        expected: usize,
        received: usize,
    },
    /// servo returned an implausible value for {0}
    DataDamaged(RegisterId),
    /// transport error: {0:?}
    Transport(ErrorKind),
}

/// Coarse classification of an [`Error`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorStatus {
    /// The request was rejected before anything was sent.
    InvalidCommand,
    /// The servo didn't answer in time. Worth retrying.
    TimedOut,
    /// The servo answered, but with nonsense.
    DataDamaged,
    /// The transport itself reported an error.
    Transport,
}

impl Error {
    pub fn status(&self) -> ErrorStatus {
        match self {
            Self::BufferTooSmall { .. } | Self::ReadOnly(_) => ErrorStatus::InvalidCommand,
            Self::TimedOut { .. } => ErrorStatus::TimedOut,
            Self::DataDamaged(_) => ErrorStatus::DataDamaged,
            Self::Transport(_) => ErrorStatus::Transport,
        }
    }
}

impl<E: embedded_io::Error> From<E> for Error {
    fn from(error: E) -> Self {
        Self::Transport(error.kind())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Why a buffer couldn't be parsed as a request frame.
#[derive(displaydoc::Display, Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameError {
    /// got an unexpected byte where a frame should start: `{0}`
    InvalidStart(u8),
    /// got an invalid control byte: `{0}`
    InvalidControl(u8),
    /// no register at address `{0}`
    UnknownAddress(u8),
    /// control byte width {control} doesn't match register {register}
    WidthMismatch { register: RegisterId, control: u8 },
    /// payload byte has its high bit set: `{0}`
    InvalidPayload(u8),
    /// frame too long
    FrameTooLong,
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}
