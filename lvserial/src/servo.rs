use crate::codec;
use crate::error::Error;
use crate::frame::Frame;
use crate::registers::RegisterId;
use crate::transport::Transport;
use crate::DeviceAddress;
use core::time::Duration;
use log::{debug, info, trace};

/// How long to wait for the servo to answer a request.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(10);

/// Value to write to `SYS_ULK` to allow writes to protected registers.
pub const UNLOCK_KEY: u8 = 0x55;

/// A single servo on a serial line.
///
/// Every request gets a response of the same width as the register, so each call here is one
/// blocking round trip. Nothing is cached between calls apart from the device address, so
/// connectivity is checked afresh every time you ask.
///
/// `T` may be a `&mut` reference if the transport needs to outlive the `Servo`.
pub struct Servo<T: Transport> {
    transport: T,
    device: DeviceAddress,
    timeout: Duration,
}

impl<T: Transport> Servo<T> {
    /// Talks to the servo at the default device address, 0.
    pub fn new(transport: T) -> Self {
        Self::with_device(transport, DeviceAddress::default())
    }

    pub fn with_device(transport: T, device: DeviceAddress) -> Self {
        Self {
            transport,
            device,
            timeout: RESPONSE_TIMEOUT,
        }
    }

    pub fn device(&self) -> DeviceAddress {
        self.device
    }

    /// Points all future requests at a different servo.
    pub fn set_device(&mut self, device: DeviceAddress) {
        self.device = device;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Reads the current value of `register`.
    pub fn read_register(&mut self, register: RegisterId) -> Result<u32, Error> {
        self.transact(Frame::read(self.device, register))
    }

    /// Stores `value` in `register`.
    ///
    /// Only the low 7 bits of each byte of the register make it to the servo, so e.g. a two byte
    /// register keeps `value & 0x3fff`.
    pub fn write_register(&mut self, register: RegisterId, value: u32) -> Result<(), Error> {
        if !register.spec().writable {
            debug!("Refusing to write {} to read-only {}", value, register);
            return Err(Error::ReadOnly(register));
        }
        self.transact(Frame::write(self.device, register, value))?;
        Ok(())
    }

    /// Reads `register` into the start of `buf` as little-endian bytes, and returns how many bytes
    /// were filled in.
    pub fn read_register_into(
        &mut self,
        register: RegisterId,
        buf: &mut [u8],
    ) -> Result<usize, Error> {
        let width = check_buffer(register, buf.len())?;
        let value = self.read_register(register)?;
        buf[..width].copy_from_slice(&value.to_le_bytes()[..width]);
        Ok(width)
    }

    /// Writes the little-endian value at the start of `buf` to `register`.
    pub fn write_register_from(&mut self, register: RegisterId, buf: &[u8]) -> Result<(), Error> {
        let width = check_buffer(register, buf.len())?;
        let mut bytes = [0; 4];
        bytes[..width].copy_from_slice(&buf[..width]);
        self.write_register(register, u32::from_le_bytes(bytes))
    }

    /// Checks that the servo is answering, and returns its product number.
    ///
    /// A servo that answers with a product number of zero is reported as `DataDamaged`.
    pub fn ping(&mut self) -> Result<u16, Error> {
        match self.read_u16(RegisterId::SysPn)? {
            0 => {
                debug!("Servo {} reported a zero product number", self.device);
                Err(Error::DataDamaged(RegisterId::SysPn))
            }
            product_number => Ok(product_number),
        }
    }

    /// Optionally switches to a different servo, then checks that it is answering and unlocks its
    /// registers for writing.
    pub fn init(&mut self, device: Option<DeviceAddress>) -> Result<u16, Error> {
        if let Some(device) = device {
            self.set_device(device);
        }
        let product_number = self.ping()?;
        self.release_write_protection(true)?;
        info!(
            "Servo {} ready, product number {:#06x}",
            self.device, product_number
        );
        Ok(product_number)
    }

    pub fn release_write_protection(&mut self, enable: bool) -> Result<(), Error> {
        let key = if enable { UNLOCK_KEY } else { 0x00 };
        self.write_register(RegisterId::SysUlk, key.into())
    }

    pub fn enable_servo_power(&mut self, enable: bool) -> Result<(), Error> {
        self.write_register(RegisterId::PwmEn, enable.into())
    }

    pub fn power_on(&mut self) -> Result<(), Error> {
        self.enable_servo_power(true)
    }

    pub fn power_off(&mut self) -> Result<(), Error> {
        self.enable_servo_power(false)
    }

    /// Sets the target position. Only the low 14 bits are sent.
    pub fn write_target_pos(&mut self, raw_pos: u16) -> Result<(), Error> {
        self.write_register(RegisterId::FbTpos, raw_pos.into())
    }

    /// The current position as a raw 14-bit reading.
    pub fn read_now_pos(&mut self) -> Result<u16, Error> {
        self.read_u16(RegisterId::MPos)
    }

    /// Supply voltage in volts.
    pub fn read_power_voltage(&mut self) -> Result<f32, Error> {
        let raw = self.read_u16(RegisterId::MVi)?;
        Ok(codec::adc_to_volts(raw.into()))
    }

    /// Back EMF of the motor in volts. Negative when the motor is turning backwards.
    pub fn read_back_emf(&mut self) -> Result<f32, Error> {
        let raw = self.read_u16(RegisterId::MVe)?;
        Ok(codec::adc_to_volts(codec::fold_signed_14(raw).into()))
    }

    /// Current speed in raw counts. Negative when turning backwards.
    pub fn read_now_speed(&mut self) -> Result<i16, Error> {
        let raw = self.read_u16(RegisterId::MSpd)?;
        Ok(codec::fold_signed_14(raw))
    }

    /// Raw temperature reading.
    pub fn read_temperature(&mut self) -> Result<u16, Error> {
        self.read_u16(RegisterId::MTemp)
    }

    fn read_u16(&mut self, register: RegisterId) -> Result<u16, Error> {
        // Two byte registers only carry 14 bits.
        self.read_register(register).map(|value| value as u16)
    }

    fn transact(&mut self, frame: Frame) -> Result<u32, Error> {
        self.exchange(&frame).map_err(|e| {
            debug!("{:?} of {} failed: {}", frame.access, frame.register, e);
            e
        })
    }

    fn exchange(&mut self, frame: &Frame) -> Result<u32, Error> {
        let width = frame.register.spec().width.bytes();
        let request = frame.to_bytes();
        trace!("Sending {:?} as {:02x?}", frame, request.as_slice());
        // Anything still waiting belongs to an earlier request that timed out.
        self.transport.discard_input()?;
        self.transport.write_all(&request)?;
        self.transport.flush()?;

        let mut response = [0; 4];
        let received = self
            .transport
            .read_timeout(&mut response[..width], self.timeout)?;
        trace!("Received {:02x?}", &response[..received]);
        if received < width {
            return Err(Error::TimedOut {
                register: frame.register,
                expected: width,
                received,
            });
        }

        Ok(codec::decode(&response[..width]))
    }
}

fn check_buffer(register: RegisterId, provided: usize) -> Result<usize, Error> {
    let needed = register.spec().width.bytes();
    if provided < needed {
        debug!(
            "Buffer of {} bytes is too small for {}, which needs {}",
            provided, register, needed
        );
        return Err(Error::BufferTooSmall {
            register,
            needed,
            provided,
        });
    }
    Ok(needed)
}
