//! Two's-complement conversion between signed values and their bit patterns.
//!
//! A negative value `v` of width `N` is stored as `!|v| + 1` computed in `N`
//! bits. The magnitude is taken as an unsigned number, so the most negative
//! value of each width converts without overflow.

macro_rules! twos_complement {
    ($($bits:literal: $to:ident, $from:ident, $ity:ty => $uty:ty;)*) => {$(
        #[doc = concat!("Return the ", stringify!($bits), "-bit two's-complement bit pattern of `value`.")]
        #[inline]
        pub const fn $to(value: $ity) -> $uty {
            if value < 0 {
                (!value.unsigned_abs()).wrapping_add(1)
            }
            else {
                value as $uty
            }
        }

        #[doc = concat!("Return the signed value of a ", stringify!($bits), "-bit two's-complement bit pattern.")]
        #[inline]
        pub const fn $from(bits: $uty) -> $ity {
            if bits >> ($bits - 1) != 0 {
                // magnitude of `iN::MIN` is one above `iN::MAX`
                ((!bits).wrapping_add(1) as $ity).wrapping_neg()
            }
            else {
                bits as $ity
            }
        }
    )*};
}

twos_complement! {
    8: to_twos_complement_8, from_twos_complement_8, i8 => u8;
    16: to_twos_complement_16, from_twos_complement_16, i16 => u16;
    32: to_twos_complement_32, from_twos_complement_32, i32 => u32;
    64: to_twos_complement_64, from_twos_complement_64, i64 => u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twos_complement_examples() {
        assert_eq!(to_twos_complement_8(-1), 0xff);
        assert_eq!(to_twos_complement_8(-100), 0x9c);
        assert_eq!(to_twos_complement_16(-1000), 0xfc18);
        assert_eq!(to_twos_complement_32(-70000), 0xfffe_ee90);
        assert_eq!(to_twos_complement_64(5), 5);
        assert_eq!(from_twos_complement_8(0x9c), -100);
        assert_eq!(from_twos_complement_16(0xfc18), -1000);
        assert_eq!(from_twos_complement_32(0x7fff_ffff), i32::MAX);
    }

    #[test]
    fn test_twos_complement_bounds() {
        macro_rules! test_bounds {
            ($($to:ident, $from:ident, $ity:ty => $uty:ty;)*) => {$(
                assert_eq!($to(<$ity>::MIN), 1 << (<$uty>::BITS - 1));
                assert_eq!($to(<$ity>::MAX), <$uty>::MAX >> 1);
                assert_eq!($to(-1), <$uty>::MAX);
                assert_eq!($to(0), 0);
                assert_eq!($from(1 << (<$uty>::BITS - 1)), <$ity>::MIN);
                assert_eq!($from(<$uty>::MAX >> 1), <$ity>::MAX);
                assert_eq!($from(<$uty>::MAX), -1);
                assert_eq!($from(0), 0);
                for v in [<$ity>::MIN, <$ity>::MIN + 1, -33, -32, -1, 0, 1, 127, <$ity>::MAX] {
                    assert_eq!($from($to(v)), v);
                    assert_eq!($to(v), v as $uty);
                }
            )*};
        }
        test_bounds! {
            to_twos_complement_8, from_twos_complement_8, i8 => u8;
            to_twos_complement_16, from_twos_complement_16, i16 => u16;
            to_twos_complement_32, from_twos_complement_32, i32 => u32;
            to_twos_complement_64, from_twos_complement_64, i64 => u64;
        }
    }
}
