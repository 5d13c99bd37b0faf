use core::fmt;
use core::hash::Hash;

/// Sealed trait pattern to restrict `PageSize` impls to our markers.
mod sealed {
    pub trait Sealed {}
}

/// Marker trait for supported region sizes.
pub trait PageSize:
    sealed::Sealed
    + Clone
    + Copy
    + Eq
    + PartialEq
    + Ord
    + PartialOrd
    + Hash
    + fmt::Display
    + fmt::Debug
{
    /// Size in bytes (power of two).
    const SIZE: u64;
    /// log2(SIZE), i.e., number of low bits used for the offset.
    const SHIFT: u32;

    fn as_str() -> &'static str;
}

/// 16 KiB translation granule (`16_384` bytes).
///
/// Every translation table is exactly one granule and must be aligned to it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Size16K;
impl sealed::Sealed for Size16K {}
impl PageSize for Size16K {
    const SIZE: u64 = 16 * 1024;
    const SHIFT: u32 = 14;

    fn as_str() -> &'static str {
        "16K"
    }
}

/// 32 MiB level-2 block (`33_554_432` bytes).
///
/// With the 16 KiB granule a level-2 descriptor covers 2²⁵ bytes; this is
/// the only mapping size the boot tables use.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Size32M;
impl sealed::Sealed for Size32M {}
impl PageSize for Size32M {
    const SIZE: u64 = 32 * 1024 * 1024;
    const SHIFT: u32 = 25;

    fn as_str() -> &'static str {
        "32M"
    }
}

impl fmt::Display for Size16K {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(Self::as_str())
    }
}

impl fmt::Display for Size32M {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(Self::as_str())
    }
}

impl fmt::Debug for Size16K {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Debug for Size32M {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

const _: () = assert!(Size16K::SIZE == 1 << Size16K::SHIFT);
const _: () = assert!(Size32M::SIZE == 1 << Size32M::SHIFT);
