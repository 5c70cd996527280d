//! IEEE-754 bit patterns assembled and taken apart with plain arithmetic.
//!
//! [`compose_f32`] and [`compose_f64`] build the binary32/binary64 layout of a
//! number without looking at its storage:
//!
//! 1. the sign bit is taken from the sign of the value,
//! 2. `|value|` is halved or doubled until it lies in `[1, 2)`, counting the
//!    steps to get the exponent, which is stored biased by 127 or 1023,
//! 3. the fractional part of the normalized mantissa is doubled 23 or 52
//!    times, and each integral part that falls out becomes the next stored
//!    mantissa bit, most significant first.
//!
//! [`reconstruct_f32`] and [`reconstruct_f64`] compute
//! `(-1)^sign × (1 + Σ bit_i × 2^-i) × 2^(exponent - bias)`.
//!
//! Every step is exact in the format being converted, so for finite normal
//! numbers the results are bit-identical to `to_bits` and `from_bits`.
//! Zeros, subnormals, infinities and NaNs are not handled: the functions
//! return `None` for them.
//!
//! The codec uses the native reinterpretation unless the `manual-float`
//! feature is enabled.

macro_rules! ieee754_codec {
    ($($compose:ident, $reconstruct:ident: $fty:ty => $uty:ty,
       mantissa $mbits:literal, exponent $ebits:literal, bias $bias:literal;)*) => {$(
        #[doc = concat!("Assemble the IEEE-754 bit pattern of a normal `", stringify!($fty), "`.")]
        ///
        /// Return `None` if `value` is zero, subnormal, infinite or NaN.
        pub fn $compose(value: $fty) -> Option<$uty> {
            if !value.is_normal() {
                return None
            }
            let sign: $uty = if value.is_sign_negative() { 1 } else { 0 };
            let mut mantissa = if sign == 1 { -value } else { value };
            let mut exponent: i32 = 0;
            while mantissa >= 2.0 {
                mantissa /= 2.0;
                exponent += 1;
            }
            while mantissa < 1.0 {
                mantissa *= 2.0;
                exponent -= 1;
            }
            let biased = (exponent + $bias) as $uty;
            let mut fraction = mantissa - 1.0;
            let mut field: $uty = 0;
            for i in (0..$mbits).rev() {
                fraction *= 2.0;
                if fraction >= 1.0 {
                    field |= 1 << i;
                    fraction -= 1.0;
                }
            }
            trace!(exponent, biased = biased as u64, mantissa = field as u64, "float bits composed");
            Some(sign << ($mbits + $ebits) | biased << $mbits | field)
        }

        #[doc = concat!("Compute the `", stringify!($fty), "` value of a normal IEEE-754 bit pattern.")]
        ///
        /// Return `None` if the exponent field is all zeros (zero or subnormal)
        /// or all ones (infinity or NaN).
        pub fn $reconstruct(bits: $uty) -> Option<$fty> {
            const EXPONENT_MASK: $uty = (1 << $ebits) - 1;
            let biased = (bits >> $mbits) & EXPONENT_MASK;
            if biased == 0 || biased == EXPONENT_MASK {
                return None
            }
            let mut value: $fty = 1.0;
            let mut weight: $fty = 1.0;
            for i in (0..$mbits).rev() {
                weight /= 2.0;
                if bits & (1 << i) != 0 {
                    value += weight;
                }
            }
            let mut exponent = biased as i32 - $bias;
            while exponent > 0 {
                value *= 2.0;
                exponent -= 1;
            }
            while exponent < 0 {
                value /= 2.0;
                exponent += 1;
            }
            if bits >> ($mbits + $ebits) != 0 {
                value = -value;
            }
            Some(value)
        }
    )*};
}

ieee754_codec! {
    compose_f32, reconstruct_f32: f32 => u32, mantissa 23, exponent 8, bias 127;
    compose_f64, reconstruct_f64: f64 => u64, mantissa 52, exponent 11, bias 1023;
}

#[cfg(not(feature = "manual-float"))]
#[inline(always)]
pub(crate) fn f32_to_bits(value: f32) -> Option<u32> {
    Some(value.to_bits())
}

#[cfg(not(feature = "manual-float"))]
#[inline(always)]
pub(crate) fn f64_to_bits(value: f64) -> Option<u64> {
    Some(value.to_bits())
}

#[cfg(not(feature = "manual-float"))]
#[inline(always)]
pub(crate) fn f32_from_bits(bits: u32) -> Option<f32> {
    Some(f32::from_bits(bits))
}

#[cfg(not(feature = "manual-float"))]
#[inline(always)]
pub(crate) fn f64_from_bits(bits: u64) -> Option<f64> {
    Some(f64::from_bits(bits))
}

#[cfg(feature = "manual-float")]
pub(crate) use self::{
    compose_f32 as f32_to_bits,
    compose_f64 as f64_to_bits,
    reconstruct_f32 as f32_from_bits,
    reconstruct_f64 as f64_from_bits
};

#[cfg(test)]
mod tests {
    use super::*;

    const F64_SAMPLES: [f64; 14] = [
        3.14, -2.5, 0.1, -0.333, 1.5, 123456.789, 1e-300, -1e300,
        f64::MAX, f64::MIN, f64::MIN_POSITIVE, f64::EPSILON,
        core::f64::consts::PI, -core::f64::consts::E
    ];

    const F32_SAMPLES: [f32; 12] = [
        3.14, -2.5, 0.1, -0.333, 1.5, 123456.79, 1e-30, -1e30,
        f32::MAX, f32::MIN, f32::MIN_POSITIVE, f32::EPSILON
    ];

    #[test]
    fn test_compose_known_patterns() {
        assert_eq!(compose_f64(3.5), Some(0x400C_0000_0000_0000));
        assert_eq!(compose_f64(-2.5), Some(0xC004_0000_0000_0000));
        assert_eq!(compose_f64(1.0), Some(0x3FF0_0000_0000_0000));
        assert_eq!(compose_f64(0.1), Some(0x3FB9_9999_9999_999A));
        assert_eq!(compose_f32(0.5), Some(0x3F00_0000));
        assert_eq!(compose_f32(-2.5), Some(0xC020_0000));
        assert_eq!(compose_f32(0.1), Some(0x3DCC_CCCD));
    }

    #[test]
    fn test_reconstruct_known_patterns() {
        assert_eq!(reconstruct_f64(0x400C_0000_0000_0000), Some(3.5));
        assert_eq!(reconstruct_f64(0xC004_0000_0000_0000), Some(-2.5));
        assert_eq!(reconstruct_f64(0x3FB9_9999_9999_999A), Some(0.1));
        assert_eq!(reconstruct_f32(0x3F00_0000), Some(0.5));
        assert_eq!(reconstruct_f32(0x3DCC_CCCD), Some(0.1));
    }

    #[test]
    fn test_matches_native_bits() {
        for v in F64_SAMPLES {
            assert_eq!(compose_f64(v), Some(v.to_bits()), "{}", v);
            assert_eq!(reconstruct_f64(v.to_bits()), Some(v), "{}", v);
        }
        for v in F32_SAMPLES {
            assert_eq!(compose_f32(v), Some(v.to_bits()), "{}", v);
            assert_eq!(reconstruct_f32(v.to_bits()), Some(v), "{}", v);
        }
    }

    #[test]
    fn test_matches_native_bits_sweep() {
        // xorshift64; every normal bit pattern it hits must survive both ways
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        for _ in 0..4000 {
            let bits = next();
            let v = f64::from_bits(bits);
            if v.is_normal() {
                assert_eq!(compose_f64(v), Some(bits));
                assert_eq!(reconstruct_f64(bits), Some(v));
            }
            let bits = (bits >> 32) as u32;
            let v = f32::from_bits(bits);
            if v.is_normal() {
                assert_eq!(compose_f32(v), Some(bits));
                assert_eq!(reconstruct_f32(bits), Some(v));
            }
        }
    }

    #[test]
    fn test_non_normal_rejected() {
        for v in [0.0, -0.0, f64::MIN_POSITIVE / 2.0, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(compose_f64(v), None);
            assert_eq!(reconstruct_f64(v.to_bits()), None);
        }
        for v in [0.0, -0.0, f32::MIN_POSITIVE / 2.0, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            assert_eq!(compose_f32(v), None);
            assert_eq!(reconstruct_f32(v.to_bits()), None);
        }
    }
}
