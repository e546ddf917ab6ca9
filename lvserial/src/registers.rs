use crate::codec::BITS_PER_BYTE;
use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

/// The number of bytes a register occupies on the wire.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Width {
    One = 1,
    Two = 2,
    Four = 4,
}

impl Width {
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// The number of value bits that survive the 7-bit wire encoding.
    pub const fn value_bits(self) -> u32 {
        BITS_PER_BYTE * self as u32
    }
}

/// Where a register lives and how it may be accessed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RegisterSpec {
    pub address: u8,
    pub width: Width,
    pub writable: bool,
}

impl RegisterSpec {
    const fn read_only(address: u8, width: Width) -> Self {
        Self {
            address,
            width,
            writable: false,
        }
    }

    const fn read_write(address: u8, width: Width) -> Self {
        Self {
            address,
            width,
            writable: true,
        }
    }

    /// The largest value this register can hold once 7-bit encoded, e.g. `0x3fff` for a two byte
    /// register.
    pub const fn max_value(&self) -> u32 {
        (1 << self.width.value_bits()) - 1
    }
}

macro_rules! registers {
    ($(
        $(#[$meta:meta])*
        $variant:ident => $name:literal, $spec:expr;
    )*) => {
        /// A register exposed by the servo firmware.
        #[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
        pub enum RegisterId {
            $(
                $(#[$meta])*
                $variant,
            )*
        }

        impl RegisterId {
            /// Every register, in table order.
            pub const ALL: &'static [RegisterId] = &[$(Self::$variant),*];

            /// Looks up the address, width and access rights of this register.
            pub const fn spec(self) -> RegisterSpec {
                match self {
                    $(Self::$variant => $spec,)*
                }
            }

            /// The register's name as it appears in the servo documentation, e.g. `FB_TPOS`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

use Width::{Four, One, Two};

registers! {
    /// Product number. Never zero on a healthy servo.
    SysPn => "SYS_PN", RegisterSpec::read_only(0x00, Two);
    /// Firmware version.
    SysVer => "SYS_VER", RegisterSpec::read_only(0x02, Two);
    /// Unique hardware id.
    SysUid => "SYS_UID", RegisterSpec::read_only(0x04, Four);
    /// Servo id on the bus.
    SysSid => "SYS_SID", RegisterSpec::read_write(0x08, One);
    SysRst => "SYS_RST", RegisterSpec::read_write(0x09, One);
    /// Baud rate.
    SysBr => "SYS_BR", RegisterSpec::read_write(0x0a, Two);
    SysT0 => "SYS_T0", RegisterSpec::read_write(0x0c, Two);
    SysRid => "SYS_RID", RegisterSpec::read_write(0x0e, One);
    SysPct => "SYS_PCT", RegisterSpec::read_write(0x10, One);
    SysDct => "SYS_DCT", RegisterSpec::read_write(0x11, One);
    SysEct => "SYS_ECT", RegisterSpec::read_write(0x12, One);
    /// Write protection. Write `0x55` to unlock, anything else to lock.
    SysUlk => "SYS_ULK", RegisterSpec::read_write(0x14, One);
    PwmPsn => "PWM_PSN", RegisterSpec::read_write(0x18, One);
    PwmPsa => "PWM_PSA", RegisterSpec::read_write(0x19, One);
    PwmSst => "PWM_SST", RegisterSpec::read_write(0x1a, Two);
    PwmSlp => "PWM_SLP", RegisterSpec::read_write(0x1c, Two);
    PwmPso => "PWM_PSO", RegisterSpec::read_write(0x1e, One);
    /// Current position.
    MPos => "M_POS", RegisterSpec::read_only(0x20, Two);
    /// Current speed, signed 14 bit.
    MSpd => "M_SPD", RegisterSpec::read_only(0x22, Two);
    /// Back EMF, signed 14 bit ADC counts.
    MVe => "M_VE", RegisterSpec::read_only(0x24, Two);
    /// Temperature.
    MTemp => "M_TEMP", RegisterSpec::read_only(0x26, Two);
    /// Supply voltage in ADC counts.
    MVi => "M_VI", RegisterSpec::read_only(0x28, Two);
    MIerr => "M_IERR", RegisterSpec::read_only(0x2a, Two);
    /// Target position.
    FbTpos => "FB_TPOS", RegisterSpec::read_write(0x30, Two);
    FbPg => "FB_PG", RegisterSpec::read_write(0x32, One);
    FbDg => "FB_DG", RegisterSpec::read_write(0x33, One);
    FbEg => "FB_EG", RegisterSpec::read_write(0x34, One);
    FbIg => "FB_IG", RegisterSpec::read_write(0x35, One);
    FbIlim => "FB_ILIM", RegisterSpec::read_write(0x36, Two);
    FbPdb => "FB_PDB", RegisterSpec::read_write(0x38, One);
    FbDdb => "FB_DDB", RegisterSpec::read_write(0x39, One);
    FbEdb => "FB_EDB", RegisterSpec::read_write(0x3a, One);
    /// Motor power. 1 enables the output stage, 0 disables it.
    PwmEn => "PWM_EN", RegisterSpec::read_write(0x3b, One);
    PwmLim => "PWM_LIM", RegisterSpec::read_write(0x3c, One);
    PwmPch => "PWM_PCH", RegisterSpec::read_write(0x3d, One);
    PwmOut => "PWM_OUT", RegisterSpec::read_only(0x3e, Two);
    AlTemp => "AL_TEMP", RegisterSpec::read_write(0x40, Two);
    SdTemp => "SD_TEMP", RegisterSpec::read_write(0x42, Two);
    AlVi => "AL_VI", RegisterSpec::read_write(0x44, Two);
    SdVi => "SD_VI", RegisterSpec::read_write(0x46, Two);
    VibOth => "VIB_OTH", RegisterSpec::read_write(0x48, One);
    VibSth => "VIB_STH", RegisterSpec::read_write(0x49, One);
    BstDum => "BST_DUM", RegisterSpec::read_write(0x4d, One);
    BstLen => "BST_LEN", RegisterSpec::read_write(0x4e, One);
    BstSyn => "BST_SYN", RegisterSpec::read_write(0x4f, One);
    BstWa0 => "BST_WA0", RegisterSpec::read_write(0x50, One);
    BstWa1 => "BST_WA1", RegisterSpec::read_write(0x51, One);
    BstWa2 => "BST_WA2", RegisterSpec::read_write(0x52, One);
    BstWa3 => "BST_WA3", RegisterSpec::read_write(0x53, One);
    BstWa4 => "BST_WA4", RegisterSpec::read_write(0x54, One);
    BstWa5 => "BST_WA5", RegisterSpec::read_write(0x55, One);
    BstWa6 => "BST_WA6", RegisterSpec::read_write(0x56, One);
    BstWa7 => "BST_WA7", RegisterSpec::read_write(0x57, One);
    BstRa0 => "BST_RA0", RegisterSpec::read_write(0x58, One);
    BstRa1 => "BST_RA1", RegisterSpec::read_write(0x59, One);
    BstRa2 => "BST_RA2", RegisterSpec::read_write(0x5a, One);
    BstRa3 => "BST_RA3", RegisterSpec::read_write(0x5b, One);
    BstRa4 => "BST_RA4", RegisterSpec::read_write(0x5c, One);
    BstRa5 => "BST_RA5", RegisterSpec::read_write(0x5d, One);
    BstRa6 => "BST_RA6", RegisterSpec::read_write(0x5e, One);
    BstRa7 => "BST_RA7", RegisterSpec::read_write(0x5f, One);
}

impl RegisterId {
    pub fn from_address(address: u8) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|register| register.spec().address == address)
    }
}

impl Display for RegisterId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(displaydoc::Display, Debug, Copy, Clone, Eq, PartialEq)]
/// unknown register name
pub struct UnknownRegister;

#[cfg(feature = "std")]
impl std::error::Error for UnknownRegister {}

impl FromStr for RegisterId {
    type Err = UnknownRegister;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|register| register.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownRegister)
    }
}
