use bitfield_struct::bitfield;

/// `CSSELR_EL1` — Cache Size Selection Register.
///
/// Selects which cache `CCSIDR_EL1` describes.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct CsselrEl1 {
    /// Bit 0 — InD: select the instruction cache.
    pub ind_instruction: bool,

    /// Bits 1–3 — Level: cache level minus one.
    #[bits(3)]
    pub level: u8,

    /// Bit 4 — TnD: allocation tag not data.
    pub tnd: bool,

    /// Bits 5–63 — RES0.
    #[bits(59)]
    _res0_5_63: u64,
}

impl CsselrEl1 {
    /// Select the data or unified cache at 1-based `level`.
    #[must_use]
    pub const fn data_or_unified(level: u8) -> Self {
        debug_assert!(level >= 1 && level <= 7);
        Self::new().with_level(level.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_stored_zero_based() {
        assert_eq!(CsselrEl1::data_or_unified(1).into_bits(), 0);
        assert_eq!(CsselrEl1::data_or_unified(2).into_bits(), 0b010);
        assert_eq!(CsselrEl1::data_or_unified(3).into_bits(), 0b100);
    }
}
