//! Run-time MMU configuration.

use boot_registers::PhysicalAddressSize;
use boot_vmem::{DEFAULT_REGIONS, physical_limit};

/// Knobs for [`Mmu`](crate::Mmu).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MmuConfig {
    /// Value for `TCR_EL2.PS`. Must reach every physical address of the
    /// default map.
    pub physical_address_size: PhysicalAddressSize,

    /// Make table walks inner-shareable, write-back cacheable and restrict
    /// the input range to 48 bits (`T0SZ = 16`). Off by default: the walker
    /// then reads the tables non-cacheable and `T0SZ` is left at zero.
    pub cacheable_table_walks: bool,
}

/// Why an [`MmuConfig`] was rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{bits}-bit physical addresses cannot reach {required:#x}")]
    UnsupportedPhysicalAddressSize { bits: u32, required: u64 },
}

impl MmuConfig {
    /// 40-bit physical addresses, non-cacheable table walks.
    pub const DEFAULT: Self = Self {
        physical_address_size: PhysicalAddressSize::Bits40,
        cacheable_table_walks: false,
    };

    /// Check that the configuration can express the default memory map.
    ///
    /// # Errors
    /// [`ConfigError::UnsupportedPhysicalAddressSize`] if the end of the
    /// highest default region lies beyond the configured address size.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let required = physical_limit(&DEFAULT_REGIONS);
        if required > self.physical_address_size.limit() {
            return Err(ConfigError::UnsupportedPhysicalAddressSize {
                bits: self.physical_address_size.bits(),
                required,
            });
        }
        Ok(())
    }
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
