use crate::codec;
use crate::error::FrameError;
use crate::registers::{RegisterId, Width};
use crate::DeviceAddress;
use arrayvec::ArrayVec;
use nb::Error::{Other, WouldBlock};

/// Set on the first byte of every frame, and on no other byte.
pub const FRAME_START: u8 = 0x80;
/// Set on every request: the servo always answers with `width` bytes.
pub const EXPECT_RESPONSE: u8 = 0x20;
/// Set on requests that store the payload.
pub const WRITE_FLAG: u8 = 0x40;

const WIDTH_MASK: u8 = 0x1f;

pub const HEADER_LEN: usize = 3;
pub const MAX_FRAME_LEN: usize = HEADER_LEN + Width::Four.bytes();

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Access {
    Read,
    Write,
}

/// A single request to the servo.
///
/// Reads carry a zero payload of the register's width, because the protocol has a payload slot on
/// every frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub device: DeviceAddress,
    pub register: RegisterId,
    pub access: Access,
    pub value: u32,
}

impl Frame {
    pub fn read(device: DeviceAddress, register: RegisterId) -> Self {
        Self {
            device,
            register,
            access: Access::Read,
            value: 0,
        }
    }

    pub fn write(device: DeviceAddress, register: RegisterId, value: u32) -> Self {
        Self {
            device,
            register,
            access: Access::Write,
            value,
        }
    }

    pub fn control_byte(&self) -> u8 {
        let write = match self.access {
            Access::Read => 0,
            Access::Write => WRITE_FLAG,
        };
        write | EXPECT_RESPONSE | self.register.spec().width as u8
    }

    pub fn to_bytes(&self) -> ArrayVec<u8, MAX_FRAME_LEN> {
        let spec = self.register.spec();
        let mut buf = ArrayVec::new();
        buf.push(FRAME_START | self.device.get());
        buf.push(self.control_byte());
        buf.push(spec.address);
        buf.extend(codec::encode(self.value, spec.width));
        buf
    }

    /// Parses a complete request frame. Returns `WouldBlock` if `buf` holds only the start of one.
    pub fn parse(buf: &[u8]) -> nb::Result<Self, FrameError> {
        let (start, control, address, payload) = match *buf {
            [] | [_] | [_, _] => {
                if let Some(&start) = buf.first() {
                    if start & FRAME_START == 0 {
                        return Err(Other(FrameError::InvalidStart(start)));
                    }
                }
                return Err(WouldBlock);
            }
            [start, control, address, ref payload @ ..] => (start, control, address, payload),
        };
        if start & FRAME_START == 0 {
            return Err(Other(FrameError::InvalidStart(start)));
        }
        let device = DeviceAddress::new(start & !FRAME_START)
            .ok_or(Other(FrameError::InvalidStart(start)))?;

        if control & (FRAME_START | EXPECT_RESPONSE) != EXPECT_RESPONSE {
            return Err(Other(FrameError::InvalidControl(control)));
        }
        let access = if control & WRITE_FLAG == 0 {
            Access::Read
        } else {
            Access::Write
        };
        let width = control & WIDTH_MASK;
        if !matches!(width, 1 | 2 | 4) {
            return Err(Other(FrameError::InvalidControl(control)));
        }

        let register =
            RegisterId::from_address(address).ok_or(Other(FrameError::UnknownAddress(address)))?;
        if register.spec().width as u8 != width {
            return Err(Other(FrameError::WidthMismatch {
                register,
                control: width,
            }));
        }

        if let Some(&byte) = payload.iter().find(|&&byte| byte & FRAME_START != 0) {
            return Err(Other(FrameError::InvalidPayload(byte)));
        }
        let width = usize::from(width);
        if payload.len() < width {
            return Err(WouldBlock);
        }
        if payload.len() > width {
            return Err(Other(FrameError::FrameTooLong));
        }

        Ok(Self {
            device,
            register,
            access,
            value: codec::decode(payload),
        })
    }
}
