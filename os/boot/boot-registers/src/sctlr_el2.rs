use bitfield_struct::bitfield;

/// `SCTLR_EL2` — System Control Register (EL2), non-VHE layout.
///
/// Only the bits the boot code cares about are exposed; everything else is
/// kept in private padding fields so that a read-modify-write cycle through
/// this type preserves the implementation's RES1/RES0 state.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct SctlrEl2 {
    /// Bit 0 — M: stage 1 address translation enable for EL2.
    pub m_mmu_enable: bool,

    /// Bit 1 — A: alignment fault checking.
    pub a_alignment_check: bool,

    /// Bit 2 — C: data and unified cache enable.
    ///
    /// When clear, all data accesses at EL2 are Non-cacheable regardless of
    /// the memory type selected by the translation.
    pub c_data_cache_enable: bool,

    /// Bit 3 — SA: SP alignment check.
    pub sa_stack_alignment_check: bool,

    /// Bits 4–11 (includes RES1 bits 4, 5 and 11).
    #[bits(8)]
    _bits_4_11: u8,

    /// Bit 12 — I: instruction cache enable.
    pub i_instruction_cache_enable: bool,

    /// Bits 13–18.
    #[bits(6)]
    _bits_13_18: u8,

    /// Bit 19 — WXN: writable memory is execute-never.
    pub wxn_write_execute_never: bool,

    /// Bits 20–24.
    #[bits(5)]
    _bits_20_24: u8,

    /// Bit 25 — EE: big-endian data accesses and table walks.
    pub ee_big_endian: bool,

    /// Bits 26–63.
    #[bits(38)]
    _bits_26_63: u64,
}

impl SctlrEl2 {
    /// Return a copy with the MMU, data cache and instruction cache enabled.
    #[inline]
    #[must_use]
    pub const fn with_translation_and_caches(self) -> Self {
        self.with_m_mmu_enable(true)
            .with_c_data_cache_enable(true)
            .with_i_instruction_cache_enable(true)
    }

    /// Return a copy with the MMU, data cache and instruction cache disabled.
    #[inline]
    #[must_use]
    pub const fn without_translation_and_caches(self) -> Self {
        self.with_m_mmu_enable(false)
            .with_c_data_cache_enable(false)
            .with_i_instruction_cache_enable(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_bits_match_architecture() {
        let s = SctlrEl2::new().with_translation_and_caches();
        assert_eq!(s.into_bits(), (1 << 12) | (1 << 2) | 1);
    }

    #[test]
    fn read_modify_write_preserves_other_bits() {
        // RES1 bits 4, 5, 11, 16, 18, 22, 23, 28, 29 as left by firmware.
        let res1: u64 = 0x30C5_0830;
        let s = SctlrEl2::from_bits(res1).with_translation_and_caches();
        assert_eq!(s.into_bits(), res1 | 0x1005);
        let back = s.without_translation_and_caches();
        assert_eq!(back.into_bits(), res1);
    }
}
