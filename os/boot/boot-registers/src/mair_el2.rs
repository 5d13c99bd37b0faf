use bitfield_struct::bitfield;

/// `MAIR_EL2` — Memory Attribute Indirection Register (EL2).
///
/// Eight one-byte attribute encodings; the `AttrIndx` field of a block or
/// page descriptor selects one of them.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct MairEl2 {
    pub attr0: u8,
    pub attr1: u8,
    pub attr2: u8,
    pub attr3: u8,
    pub attr4: u8,
    pub attr5: u8,
    pub attr6: u8,
    pub attr7: u8,
}

impl MairEl2 {
    /// Return a copy with slot `index` (`0..8`) set to `encoding`.
    #[inline]
    #[must_use]
    pub const fn with_attr(self, index: u8, encoding: u8) -> Self {
        debug_assert!(index < 8);
        let shift = (index as u64 & 7) * 8;
        let bits = self.into_bits() & !(0xff << shift);
        Self::from_bits(bits | ((encoding as u64) << shift))
    }

    /// The encoding in slot `index` (`0..8`).
    #[inline]
    #[must_use]
    pub const fn attr(self, index: u8) -> u8 {
        debug_assert!(index < 8);
        let shift = (index as u64 & 7) * 8;
        ((self.into_bits() >> shift) & 0xff) as u8
    }
}
