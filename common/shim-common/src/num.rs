//! Bit-field helpers for decoding packed hardware words

use std::ops::RangeInclusive;

pub trait GetBit: Copy {
    #[must_use]
    fn bit(self, i: u8) -> bool;

    /// Extract the inclusive bit range `range`, shifted down to bit 0.
    #[must_use]
    fn bits(self, range: RangeInclusive<u8>) -> Self;
}

macro_rules! impl_get_bit {
    ($t:ty) => {
        impl GetBit for $t {
            #[inline]
            fn bit(self, i: u8) -> bool {
                debug_assert!(i < (<$t>::BITS as u8));
                self & (1 << i) != 0
            }

            #[inline]
            fn bits(self, range: RangeInclusive<u8>) -> Self {
                let start = *range.start();
                let end = *range.end();
                debug_assert!(start <= end && end < (<$t>::BITS as u8));

                let width = u32::from(end - start + 1);
                if width == <$t>::BITS {
                    return self;
                }

                (self >> start) & ((1 << width) - 1)
            }
        }
    };
}

impl_get_bit!(u8);
impl_get_bit!(u16);
impl_get_bit!(u32);
