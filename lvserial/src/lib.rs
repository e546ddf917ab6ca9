//! A driver for LV series serial servos.
//!
//! The servo exposes a table of registers (see [`RegisterId`]). Each request names one register
//! and always gets back exactly as many bytes as the register is wide:
//!
//! ```text
//! 0x80 | device, [write: 0x40] | 0x20 | width, address, payload[width]
//! ```
//!
//! Payload bytes only carry 7 bits each (see [`codec`]), so the high bit can mark the start of a
//! frame.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lvserial::{Servo, SerialPortTransport, DEFAULT_BAUD_RATE};
//!
//! let transport = SerialPortTransport::open("/dev/ttyUSB0", DEFAULT_BAUD_RATE)?;
//! let mut servo = Servo::new(transport);
//! servo.init(None)?;
//! servo.power_on()?;
//! servo.write_target_pos(2048)?;
//! println!("at {}, {} V", servo.read_now_pos()?, servo.read_power_voltage()?);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod codec;
mod error;
pub mod frame;
#[cfg(test)]
mod mock;
mod registers;
mod servo;
mod transport;

use core::fmt::{self, Display, Formatter};

pub use embedded_io::{ErrorKind, ErrorType};
pub use error::{Error, ErrorStatus, FrameError};
pub use registers::{RegisterId, RegisterSpec, UnknownRegister, Width};
pub use servo::{Servo, RESPONSE_TIMEOUT, UNLOCK_KEY};
pub use transport::Transport;
#[cfg(feature = "std")]
pub use transport::{SerialPortTransport, DEFAULT_BAUD_RATE};

/// The 7-bit id that selects one servo on a shared line.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    pub const MAX: u8 = 0x7f;

    /// Returns `None` if `id` doesn't fit in 7 bits.
    pub const fn new(id: u8) -> Option<Self> {
        if id > Self::MAX {
            None
        } else {
            Some(Self(id))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Display for DeviceAddress {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_address_range() {
        assert_eq!(DeviceAddress::new(0), Some(DeviceAddress::default()));
        assert_eq!(DeviceAddress::new(127).map(DeviceAddress::get), Some(127));
        assert_eq!(DeviceAddress::new(128), None);
    }
}
