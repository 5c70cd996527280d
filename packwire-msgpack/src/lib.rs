//! A MessagePack encoder writing to [`packwire`](`packwire`) sinks and a decoder reading from byte slices.
/*!

[`Encoder`] always picks the most compact representation of a value:

| Rust value          | MessagePack type
|---------------------|--------------------
| `()`, `None`        | `nil`
| `bool`              | `bool`
| `u8`-`u64`          | `positive fixint`, `uint 8/16/32/64` (smallest representation)
| `i8`-`i64`          | `fixint`, `int 8/16/32/64` (smallest representation)
| `f32`               | `float 32`, or an integer when the value is integral
| `f64`               | `float 64`, or an integer when the value is integral
| `str`, `String`     | `fixstr`, `str 8/16/32`
| [`Bin`]             | `bin 8/16/32`
| `[T]`, `[T; N]`, `Vec<T>`, `VecDeque<T>`, `LinkedList<T>` | `fixarray`, `array 16/32`
| `BTreeSet`, `HashSet` | `fixarray`, `array 16/32`
| `BTreeMap`, `HashMap` | `fixmap`, `map 16/32`
| [`Value`]           | according to the variant

[`Decoder`] accepts every MessagePack integer and float encoding for a numeric
target, as long as the decoded number fits the target without loss. Integers
narrower than the target are sign- or zero-extended. A number that does not
fit the requested type fails with `Error::Narrowing`.

Integral floats are written as integers, so a decoder can not tell `4.0` from
`4`. Reading such a value back into a float target gives the same number;
reading it into a [`Value`] gives [`Value::UInt`] or [`Value::Int`].

Neither [`Encoder`] nor [`Decoder`] supports MessagePack extension types or
timestamps. The `ext` and `fixext` codes are recognized and rejected
with `Error::UnsupportedType`.

Multiple values written one after another can be read back with
[`Decoder::decode_sequence`]:

```
# #[cfg(any(feature = "std", feature = "alloc"))] {
use packwire_msgpack::{Encoder, Decoder};

let mut encoder = Encoder::new(Vec::new());
encoder.encode_sequence((&-1000i16, "hi", &3.5f64)).unwrap();
assert_eq!(encoder.as_bytes(), b"\xD1\xFC\x18\xA2hi\xCB\x40\x0C\x00\x00\x00\x00\x00\x00");

let (mut a, mut b, mut c) = (0i32, "", 0.0f64);
let mut decoder = Decoder::from_slice(encoder.as_bytes());
decoder.decode_sequence((&mut a, &mut b, &mut c)).unwrap();
assert_eq!((a, b, c), (-1000, "hi", 3.5));
# }
```

[`Value`]: value::Value
[`Value::UInt`]: value::Value::UInt
[`Value::Int`]: value::Value::Int
*/
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc",not(feature = "std")))]
extern crate alloc;

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
    }};
}

pub mod twos;
pub mod ieee754;
pub mod encode;
pub mod decode;
pub mod pack;
#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
pub mod value;

pub use packwire;
pub use packwire::{PackWrite, PackBuffer};

pub use encode::{Encoder, to_writer};
#[cfg(any(feature = "std", feature = "alloc"))]
pub use encode::to_vec;

pub use decode::{
    Decoder,
    Integer,
    IntWidth,
    from_slice,
    from_slice_split_tail
};

pub use pack::{Pack, Unpack, Bin, PackFields, UnpackFields};

#[cfg(any(feature = "std", feature = "alloc"))]
pub use value::Value;

/// MessagePack format codes.
///
/// Every code determines how many bytes follow it and how they are laid out.
/// All multi-byte lengths and payloads are big-endian.
pub mod magick {
    use core::ops::RangeInclusive;
    pub const MIN_POSFIXINT: u8 = 0x00;
    pub const MAX_POSFIXINT: u8 = 0x7f;
    pub const NEGFIXINT: u8 = 0b11100000;
    pub const MIN_NEGFIXINT: i8 = NEGFIXINT as i8; //-32
    /// Signed values encoded as a single byte.
    pub const FIXINT_I64: RangeInclusive<i64> = MIN_NEGFIXINT as i64..=MAX_POSFIXINT as i64;
    pub const NIL: u8      = 0xc0;
    pub const RESERVED: u8 = 0xc1;
    pub const FALSE: u8    = 0xc2;
    pub const TRUE: u8     = 0xc3;

    pub const FIXMAP: u8   = 0x80; /* 1000xxxx */
    pub const MAX_FIXMAP_SIZE: usize = 0b1111;
    pub const FIXMAP_MAX: u8 = FIXMAP + MAX_FIXMAP_SIZE as u8; /* 10001111 */

    pub const FIXARRAY: u8 = 0x90; /* 1001xxxx */
    pub const MAX_FIXARRAY_SIZE: usize = 0b1111;
    pub const FIXARRAY_MAX: u8 = FIXARRAY + MAX_FIXARRAY_SIZE as u8; /* 10011111 */

    pub const FIXSTR: u8   = 0xa0; /* 101xxxxx */
    pub const MAX_FIXSTR_SIZE: usize = 0b11111;
    pub const FIXSTR_MAX: u8 = FIXSTR + MAX_FIXSTR_SIZE as u8; /* 10111111 */

    pub const BIN_8: u8     = 0xc4;
    pub const BIN_16: u8    = 0xc5;
    pub const BIN_32: u8    = 0xc6;

    pub const EXT_8: u8     = 0xc7;
    pub const EXT_16: u8    = 0xc8;
    pub const EXT_32: u8    = 0xc9;

    pub const FLOAT_32: u8  = 0xca;
    pub const FLOAT_64: u8  = 0xcb;

    pub const UINT_8: u8    = 0xcc;
    pub const UINT_16: u8   = 0xcd;
    pub const UINT_32: u8   = 0xce;
    pub const UINT_64: u8   = 0xcf;

    pub const INT_8: u8     = 0xd0;
    pub const INT_16: u8    = 0xd1;
    pub const INT_32: u8    = 0xd2;
    pub const INT_64: u8    = 0xd3;

    pub const FIXEXT_1: u8  = 0xd4;
    pub const FIXEXT_2: u8  = 0xd5;
    pub const FIXEXT_4: u8  = 0xd6;
    pub const FIXEXT_8: u8  = 0xd7;
    pub const FIXEXT_16: u8 = 0xd8;

    pub const STR_8: u8     = 0xd9;
    pub const STR_16: u8    = 0xda;
    pub const STR_32: u8    = 0xdb;

    pub const ARRAY_16: u8  = 0xdc;
    pub const ARRAY_32: u8  = 0xdd;

    pub const MAP_16: u8    = 0xde;
    pub const MAP_32: u8    = 0xdf;

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_fix_ranges() {
            assert_eq!(FIXMAP_MAX, 0x8f);
            assert_eq!(FIXARRAY_MAX, 0x9f);
            assert_eq!(FIXSTR_MAX, 0xbf);
            assert_eq!(MIN_NEGFIXINT, -32);
            assert_eq!(*FIXINT_I64.start(), -32);
            assert_eq!(*FIXINT_I64.end(), 127);
            // fix encodings and explicit codes never overlap
            for code in NIL..NEGFIXINT {
                assert!(!(FIXMAP..=FIXSTR_MAX).contains(&code));
                assert!(code > MAX_POSFIXINT);
            }
        }
    }
}
