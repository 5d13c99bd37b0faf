use bitfield_struct::bitfield;

/// `TCR_EL2` — Translation Control Register (EL2), non-VHE layout.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct TcrEl2 {
    /// Bits 0–5 — T0SZ: the input address region is 2^(64-T0SZ) bytes.
    #[bits(6)]
    pub t0sz: u8,

    /// Bits 6–7 — RES0.
    #[bits(2)]
    _res0_6_7: u8,

    /// Bits 8–9 — IRGN0: inner cacheability of table walks.
    #[bits(2)]
    pub irgn0: u8,

    /// Bits 10–11 — ORGN0: outer cacheability of table walks.
    #[bits(2)]
    pub orgn0: u8,

    /// Bits 12–13 — SH0: shareability of table walks.
    #[bits(2)]
    pub sh0: u8,

    /// Bits 14–15 — TG0: translation granule.
    #[bits(2)]
    pub tg0: u8,

    /// Bits 16–18 — PS: physical address size.
    #[bits(3)]
    pub ps: u8,

    /// Bits 19–63 (TBI, HA, HD, RES1 23/31, …).
    #[bits(45)]
    _bits_19_63: u64,
}

/// Translation granule sizes as encoded in `TCR_EL2.TG0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Granule {
    Size4K,
    Size64K,
    Size16K,
}

/// Physical address sizes as encoded in `TCR_EL2.PS`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PhysicalAddressSize {
    /// 32 bits, 4 GiB.
    Bits32,
    /// 36 bits, 64 GiB.
    Bits36,
    /// 40 bits, 1 TiB.
    Bits40,
    /// 42 bits, 4 TiB.
    Bits42,
    /// 44 bits, 16 TiB.
    Bits44,
    /// 48 bits, 256 TiB.
    Bits48,
    /// 52 bits, 4 PiB (requires `FEAT_LPA`).
    Bits52,
}

/// Cacheability of table walk accesses (`IRGN0` / `ORGN0`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cacheability {
    NonCacheable,
    WriteBackWriteAllocate,
    WriteThrough,
    WriteBackNoWriteAllocate,
}

/// Shareability of table walk accesses (`SH0`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shareability {
    NonShareable,
    OuterShareable,
    InnerShareable,
}

impl Granule {
    #[must_use]
    pub const fn encoding(self) -> u8 {
        match self {
            Self::Size4K => 0b00,
            Self::Size64K => 0b01,
            Self::Size16K => 0b10,
        }
    }
}

impl PhysicalAddressSize {
    #[must_use]
    pub const fn encoding(self) -> u8 {
        match self {
            Self::Bits32 => 0b000,
            Self::Bits36 => 0b001,
            Self::Bits40 => 0b010,
            Self::Bits42 => 0b011,
            Self::Bits44 => 0b100,
            Self::Bits48 => 0b101,
            Self::Bits52 => 0b110,
        }
    }

    /// Number of physical address bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits36 => 36,
            Self::Bits40 => 40,
            Self::Bits42 => 42,
            Self::Bits44 => 44,
            Self::Bits48 => 48,
            Self::Bits52 => 52,
        }
    }

    /// One past the highest reachable physical address.
    #[must_use]
    pub const fn limit(self) -> u64 {
        1 << self.bits()
    }
}

impl Cacheability {
    #[must_use]
    pub const fn encoding(self) -> u8 {
        match self {
            Self::NonCacheable => 0b00,
            Self::WriteBackWriteAllocate => 0b01,
            Self::WriteThrough => 0b10,
            Self::WriteBackNoWriteAllocate => 0b11,
        }
    }
}

impl Shareability {
    #[must_use]
    pub const fn encoding(self) -> u8 {
        match self {
            Self::NonShareable => 0b00,
            Self::OuterShareable => 0b10,
            Self::InnerShareable => 0b11,
        }
    }
}

impl TcrEl2 {
    #[inline]
    #[must_use]
    pub const fn with_granule(self, granule: Granule) -> Self {
        self.with_tg0(granule.encoding())
    }

    #[inline]
    #[must_use]
    pub const fn with_physical_address_size(self, size: PhysicalAddressSize) -> Self {
        self.with_ps(size.encoding())
    }

    /// Set inner and outer cacheability plus shareability of table walks.
    #[inline]
    #[must_use]
    pub const fn with_walk_attributes(self, cache: Cacheability, share: Shareability) -> Self {
        self.with_irgn0(cache.encoding())
            .with_orgn0(cache.encoding())
            .with_sh0(share.encoding())
    }

    /// Set T0SZ for an input address space of `bits` bits.
    #[inline]
    #[must_use]
    pub const fn with_input_address_bits(self, bits: u8) -> Self {
        debug_assert!(bits <= 64);
        self.with_t0sz(64 - bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granule_and_pa_size_encodings() {
        let tcr = TcrEl2::new()
            .with_granule(Granule::Size16K)
            .with_physical_address_size(PhysicalAddressSize::Bits40);
        assert_eq!(tcr.into_bits(), (0b10 << 14) | (0b010 << 16));
    }

    #[test]
    fn walk_attributes_encoding() {
        let tcr = TcrEl2::new()
            .with_walk_attributes(
                Cacheability::WriteBackWriteAllocate,
                Shareability::InnerShareable,
            )
            .with_input_address_bits(48);
        assert_eq!(
            tcr.into_bits(),
            (0b11 << 12) | (0b01 << 10) | (0b01 << 8) | 16
        );
    }

    #[test]
    fn pa_size_limits() {
        assert_eq!(PhysicalAddressSize::Bits40.limit(), 0x100_0000_0000);
        assert!(PhysicalAddressSize::Bits36 < PhysicalAddressSize::Bits40);
    }
}
