//! Memory attribute slots.
//!
//! A block descriptor does not carry cacheability itself; it names one of the
//! eight `MAIR_EL2` slots. The boot code programs three of them.

use core::fmt;

/// Memory type of a mapping, identified by its `MAIR_EL2` slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum MemoryAttribute {
    /// Slot 0: Normal memory, inner/outer write-back non-transient,
    /// read- and write-allocate.
    Normal = 0,
    /// Slot 1: Device-nGnRnE (strongly ordered, no early write acknowledgement).
    DeviceNgnrne = 1,
    /// Slot 2: Device-nGnRE (early write acknowledgement allowed).
    DeviceNgnre = 2,
}

impl MemoryAttribute {
    /// Every attribute, in slot order.
    pub const ALL: [Self; 3] = [Self::Normal, Self::DeviceNgnrne, Self::DeviceNgnre];

    /// The `AttrIndx` value stored in descriptors.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// The byte this slot holds in `MAIR_EL2`.
    #[must_use]
    pub const fn mair_encoding(self) -> u8 {
        match self {
            Self::Normal => 0xff,
            Self::DeviceNgnrne => 0x00,
            Self::DeviceNgnre => 0x04,
        }
    }

    /// Inverse of [`index`](Self::index); `None` for unprogrammed slots.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Normal),
            1 => Some(Self::DeviceNgnrne),
            2 => Some(Self::DeviceNgnre),
            _ => None,
        }
    }
}

impl fmt::Display for MemoryAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "Normal WB RWA",
            Self::DeviceNgnrne => "Device-nGnRnE",
            Self::DeviceNgnre => "Device-nGnRE",
        })
    }
}
