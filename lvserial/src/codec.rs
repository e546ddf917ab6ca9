//! The 7-bit clean payload encoding.
//!
//! The high bit of every byte on the wire is reserved for marking the start of a frame, so a value
//! is sent as little-endian groups of 7 bits, one group per byte. A two byte register therefore
//! only holds 14 bits and a four byte register 28 bits. Anything above that is truncated.

use crate::registers::Width;
use arrayvec::ArrayVec;

/// Usable value bits in each payload byte.
pub const BITS_PER_BYTE: u32 = 7;

const PAYLOAD_MASK: u8 = 0x7f;

/// Raw reading that corresponds to `FULL_SCALE_VOLTS`.
pub const ADC_FULL_SCALE: f32 = 4096.0;
pub const FULL_SCALE_VOLTS: f32 = 27.5;

/// Packs `value` into `width` bytes, least significant group first.
pub fn encode(value: u32, width: Width) -> ArrayVec<u8, 4> {
    (0..width.bytes() as u32)
        .map(|i| (value >> (BITS_PER_BYTE * i)) as u8 & PAYLOAD_MASK)
        .collect()
}

/// Reassembles a value from 7-bit groups. The high bit of each byte is ignored.
pub fn decode(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(Width::Four.bytes())
        .enumerate()
        .fold(0, |value, (i, &byte)| {
            value | u32::from(byte & PAYLOAD_MASK) << (BITS_PER_BYTE * i as u32)
        })
}

/// Interprets a raw 14-bit reading as signed, folding everything above `0x2000` into the negative
/// half.
pub fn fold_signed_14(raw: u16) -> i16 {
    let raw = (raw & 0x3fff) as i16;
    if raw > 0x2000 {
        raw - 0x4000
    } else {
        raw
    }
}

/// Converts a raw ADC reading to volts.
pub fn adc_to_volts(raw: i32) -> f32 {
    FULL_SCALE_VOLTS * raw as f32 / ADC_FULL_SCALE
}
