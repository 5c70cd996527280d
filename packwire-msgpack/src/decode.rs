//! MessagePack decoder
#[cfg(feature = "std")]
use std::{vec::Vec, string::String};

#[cfg(all(feature = "alloc",not(feature = "std")))]
use alloc::{vec::Vec, string::String};

use core::convert::Infallible;
use core::num::TryFromIntError;
use core::str::Utf8Error;
use core::fmt;

use crate::ieee754;
use crate::magick::*;
use crate::pack::{Unpack, UnpackFields};
use crate::twos::*;

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::value::Value;

/// Nesting limit of a [`Decoder`] created with [`Decoder::from_slice`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Decode an instance of type `T` from a slice of bytes in a MessagePack format.
///
/// Return a tuple with `(value, msgpack_len)`. `msgpack_len` <= `input.len()`.
///
/// Any `&str` or `&[u8]` in the returned type will contain references to the provided slice.
pub fn from_slice<'a, T>(input: &'a[u8]) -> Result<(T, usize)>
    where T: Unpack<'a>
{
    let mut de = Decoder::from_slice(input);
    let value = T::unpack(&mut de)?;
    let tail_len = de.end()?;

    Ok((value, input.len() - tail_len))
}

/// Decode an instance of type `T` from a slice of bytes in a MessagePack format.
///
/// Return a tuple with `(value, tail)`, where `tail` is the tail of the input beginning
/// at the byte following the last byte of the encoded data.
///
/// Any `&str` or `&[u8]` in the returned type will contain references to the provided slice.
pub fn from_slice_split_tail<'a, T>(input: &'a[u8]) -> Result<(T, &'a[u8])>
    where T: Unpack<'a>
{
    let (value, len) = from_slice(input)?;
    Ok((value, &input[len..]))
}

/// MessagePack decoder.
///
/// * decodes data from a borrowed slice, never modifying it,
/// * decodes borrowed references to `&str` and `&[u8]` types,
/// * decodes integers from any MessagePack integer format as long as the
///   number fits the requested type,
/// * decodes floats from any MessagePack integer or float format as long as
///   the requested type holds the number exactly,
/// * refuses containers nested deeper than its depth limit.
///
/// After a successful decode the cursor points at the first byte past the
/// decoded value. After a failed decode the cursor position is unspecified.
#[derive(Debug, Clone)]
pub struct Decoder<'de> {
    input: &'de[u8],
    index: usize,
    depth: usize,
    max_depth: usize,
}

/// Decoding result
pub type Result<T> = core::result::Result<T, Error>;

/// Decoding error
#[derive(Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The input ended before the value did
    TruncatedInput,
    /// Reserved code was detected
    ReservedCode,
    /// Extension type code was detected
    UnsupportedType(u8),
    /// Number does not fit the requested type
    Narrowing,
    /// A float that is not a finite normal number reached the arithmetic
    /// float decoder (`manual-float` feature)
    UnsupportedFloat,
    /// Expected NIL type
    ExpectedNil,
    /// Expected a boolean type
    ExpectedBool,
    /// Expected an integer type
    ExpectedInteger,
    /// Expected a number type
    ExpectedNumber,
    /// Expected a string
    ExpectedString,
    /// Expected a binary type
    ExpectedBin,
    /// Expected an array type
    ExpectedArray,
    /// Expected a map type
    ExpectedMap,
    /// Invalid UTF-8 in a string
    InvalidUnicode,
    /// Containers are nested too deep
    DepthLimitExceeded,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::TruncatedInput => "Unexpected end of MessagePack input",
            Error::ReservedCode => "Reserved MessagePack code in input",
            Error::UnsupportedType(code) => {
                return write!(f, "Unsupported MessagePack extension code 0x{:02x} in input", code)
            }
            Error::Narrowing => "Number does not fit the decoded type",
            Error::UnsupportedFloat => "Float value can not be decoded arithmetically",
            Error::ExpectedNil => "Expected MessagePack nil",
            Error::ExpectedBool => "Expected MessagePack bool",
            Error::ExpectedInteger => "Expected MessagePack integer",
            Error::ExpectedNumber => "Expected MessagePack number",
            Error::ExpectedString => "Expected MessagePack string",
            Error::ExpectedBin => "Expected MessagePack bin",
            Error::ExpectedArray => "Expected MessagePack array",
            Error::ExpectedMap => "Expected MessagePack map",
            Error::InvalidUnicode => "Invalid UTF-8 in MessagePack string",
            Error::DepthLimitExceeded => "MessagePack containers nested too deep",
        })
    }
}

impl From<TryFromIntError> for Error {
    fn from(_err: TryFromIntError) -> Self {
        Error::Narrowing
    }
}

impl From<Infallible> for Error {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

impl From<Utf8Error> for Error {
    fn from(_err: Utf8Error) -> Self {
        Error::InvalidUnicode
    }
}

/// A decoded MessagePack integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integer {
    /// Read from a negative fixint or an `int 8/16/32/64` format
    Signed(i64),
    /// Read from a positive fixint or a `uint 8/16/32/64` format
    Unsigned(u64),
}

/// The width of an integer as it was found on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    /// Stored in the format byte itself
    Fix,
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

/// Whether `f` is exactly the integer `n`.
///
/// The upper bounds reject values rounded up past the integer range, which
/// a saturating `as` cast back would map onto `MAX`.
fn exact_float(n: Integer, f: f64) -> bool {
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    const U64_END: f64 = 18_446_744_073_709_551_616.0;
    match n {
        Integer::Signed(n) => f < I64_END && f as i64 == n,
        Integer::Unsigned(n) => f < U64_END && f as u64 == n
    }
}

enum MsgType {
    Single(usize),
    Array(usize),
    Map(usize),
}

/// Cursor methods of a `Decoder` are public to allow custom manipulation of
/// MessagePack encoded data, e.g. splitting a stream of messages without
/// fully decoding them.
impl<'de> Decoder<'de> {
    /// Create a new decoder instance by providing a slice from which to
    /// decode messages.
    pub fn from_slice(input: &'de[u8]) -> Self {
        Decoder { input, index: 0, depth: 0, max_depth: DEFAULT_MAX_DEPTH }
    }
    /// Set how deep containers may nest when decoded with
    /// [`Decoder::decode_value`] or walked with [`Decoder::skip_value`].
    ///
    /// A limit of 0 refuses any array or map.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
    /// Consume [`Decoder`] and return the number of unparsed bytes in
    /// the input slice on success.
    ///
    /// If the input cursor points outside the input slice, an error
    /// `Error::TruncatedInput` is returned.
    pub fn end(self) -> Result<usize> {
        self.input.len()
        .checked_sub(self.index)
        .ok_or(Error::TruncatedInput)
    }
    /// Return the input cursor: the offset of the next byte to decode.
    #[inline]
    pub fn position(&self) -> usize {
        self.index
    }
    /// Move the input cursor to `position`.
    ///
    /// A position past the end of the input is accepted, every following
    /// read fails with `Error::TruncatedInput`.
    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.index = position;
    }
    /// Return the remaining number of unparsed bytes in the input slice.
    ///
    /// Returns 0 when the input cursor points either at the end or beyond
    /// the end of the input slice.
    #[inline]
    pub fn remaining_len(&self) -> usize {
        self.input.len().saturating_sub(self.index)
    }
    /// Peek at the next byte code and return it on success, otherwise return
    /// `Err(Error::TruncatedInput)` if there are no more unparsed bytes
    /// remaining in the input slice.
    #[inline]
    pub fn peek(&self) -> Result<u8> {
        self.input.get(self.index).copied()
        .ok_or(Error::TruncatedInput)
    }
    /// Return a reference to the unparsed portion of the input slice on success.
    ///
    /// If the input cursor points outside the input slice, an error
    /// `Error::TruncatedInput` is returned.
    #[inline]
    pub fn input_ref(&self) -> Result<&'de[u8]> {
        let input = self.input;
        input.get(self.index..).ok_or(Error::TruncatedInput)
    }
    /// Return the next `len` bytes of the unparsed input with the lifetime of
    /// the original slice and advance the cursor past them.
    pub fn split_input(&mut self, len: usize) -> Result<&'de[u8]> {
        let (res, _) = self.input_ref()?
                    .split_at_checked(len)
                    .ok_or(Error::TruncatedInput)?;
        self.index += len;
        Ok(res)
    }
    /// Fetch the next byte from input or return an `Err::TruncatedInput` error.
    pub fn fetch(&mut self) -> Result<u8> {
        let c = self.peek()?;
        self.index += 1;
        Ok(c)
    }

    fn fetch_array<const N: usize>(&mut self) -> Result<[u8;N]> {
        let (res, _) = self.input_ref()?
                    .split_first_chunk::<N>()
                    .ok_or(Error::TruncatedInput)?;
        self.index += N;
        Ok(*res)
    }

    fn fetch_u8(&mut self) -> Result<u8> {
        self.fetch()
    }

    fn fetch_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.fetch_array()?))
    }

    fn fetch_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.fetch_array()?))
    }

    fn fetch_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.fetch_array()?))
    }

    fn fetch_len32(&mut self) -> Result<usize> {
        Ok(self.fetch_u32()?.try_into()?)
    }

    fn fetch_f32(&mut self) -> Result<f32> {
        ieee754::f32_from_bits(self.fetch_u32()?).ok_or(Error::UnsupportedFloat)
    }

    fn fetch_f64(&mut self) -> Result<f64> {
        ieee754::f64_from_bits(self.fetch_u64()?).ok_or(Error::UnsupportedFloat)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            debug!(depth = self.depth, position = self.index, "MessagePack nesting limit reached");
            return Err(Error::DepthLimitExceeded)
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    /// Decode any [`Unpack`] implementation.
    #[inline]
    pub fn decode<T: Unpack<'de>>(&mut self) -> Result<T> {
        T::unpack(self)
    }

    /// Decode fields one after another, with no container header.
    ///
    /// `fields` is a tuple of mutable references, e.g. `(&mut a, &mut b)`.
    /// Each field is assigned as soon as it is decoded.
    #[inline]
    pub fn decode_sequence<F: UnpackFields<'de>>(&mut self, fields: F) -> Result<()> {
        fields.unpack_fields(self)
    }

    pub fn decode_nil(&mut self) -> Result<()> {
        match self.fetch()? {
            NIL => Ok(()),
            _ => Err(Error::ExpectedNil)
        }
    }

    pub fn decode_bool(&mut self) -> Result<bool> {
        match self.fetch()? {
            TRUE => Ok(true),
            FALSE => Ok(false),
            _ => Err(Error::ExpectedBool)
        }
    }

    /// Decode an integer of any MessagePack integer format, returning its
    /// value and the width it was stored with.
    pub fn decode_integer(&mut self) -> Result<(Integer, IntWidth)> {
        use Integer::*;
        use IntWidth::*;
        let res = match self.fetch()? {
            n@(MIN_POSFIXINT..=MAX_POSFIXINT) => (Unsigned(n.into()), Fix),
            n@(NEGFIXINT..=0xff) => (Signed(from_twos_complement_8(n).into()), Fix),
            UINT_8  => (Unsigned(self.fetch_u8()?.into()), Bits8),
            UINT_16 => (Unsigned(self.fetch_u16()?.into()), Bits16),
            UINT_32 => (Unsigned(self.fetch_u32()?.into()), Bits32),
            UINT_64 => (Unsigned(self.fetch_u64()?), Bits64),
            INT_8   => (Signed(from_twos_complement_8(self.fetch_u8()?).into()), Bits8),
            INT_16  => (Signed(from_twos_complement_16(self.fetch_u16()?).into()), Bits16),
            INT_32  => (Signed(from_twos_complement_32(self.fetch_u32()?).into()), Bits32),
            INT_64  => (Signed(from_twos_complement_64(self.fetch_u64()?)), Bits64),
            _ => return Err(Error::ExpectedInteger)
        };
        Ok(res)
    }

    /// Decode an integer of any MessagePack integer format into `N`.
    ///
    /// Return `Error::Narrowing` if the value does not fit `N`.
    pub fn decode_int<N>(&mut self) -> Result<N>
        where N: TryFrom<i64> + TryFrom<u64>,
              Error: From<<N as TryFrom<i64>>::Error>,
              Error: From<<N as TryFrom<u64>>::Error>,
    {
        let n = match self.decode_integer()?.0 {
            Integer::Signed(n) => <N as TryFrom<i64>>::try_from(n)?,
            Integer::Unsigned(n) => <N as TryFrom<u64>>::try_from(n)?,
        };
        Ok(n)
    }

    /// Decode a number of any MessagePack float or integer format as `f64`.
    ///
    /// An integer is accepted only if `f64` holds it exactly, otherwise
    /// `Error::Narrowing` is returned.
    pub fn decode_f64(&mut self) -> Result<f64> {
        match self.peek()? {
            FLOAT_32 => {
                self.index += 1;
                Ok(self.fetch_f32()?.into())
            }
            FLOAT_64 => {
                self.index += 1;
                self.fetch_f64()
            }
            _ => match self.decode_integer() {
                Ok((n, _)) => {
                    let f = match n {
                        Integer::Signed(n) => n as f64,
                        Integer::Unsigned(n) => n as f64
                    };
                    exact_float(n, f).then_some(f).ok_or(Error::Narrowing)
                }
                Err(Error::ExpectedInteger) => Err(Error::ExpectedNumber),
                Err(err) => Err(err)
            }
        }
    }

    /// Decode a number of any MessagePack float or integer format as `f32`.
    ///
    /// A `float 64` or an integer is accepted only if `f32` holds the exact
    /// same value, otherwise `Error::Narrowing` is returned.
    pub fn decode_f32(&mut self) -> Result<f32> {
        match self.peek()? {
            FLOAT_32 => {
                self.index += 1;
                self.fetch_f32()
            }
            FLOAT_64 => {
                self.index += 1;
                let v = self.fetch_f64()?;
                let f = v as f32;
                if f64::from(f) == v || v.is_nan() {
                    Ok(f)
                }
                else {
                    Err(Error::Narrowing)
                }
            }
            _ => match self.decode_integer() {
                Ok((n, _)) => {
                    let f = match n {
                        Integer::Signed(n) => n as f32,
                        Integer::Unsigned(n) => n as f32
                    };
                    exact_float(n, f.into()).then_some(f).ok_or(Error::Narrowing)
                }
                Err(Error::ExpectedInteger) => Err(Error::ExpectedNumber),
                Err(err) => Err(err)
            }
        }
    }

    /// Decode a string header and return the string length in bytes.
    pub fn decode_str_len(&mut self) -> Result<usize> {
        let len: usize = match self.fetch()? {
            c@(FIXSTR..=FIXSTR_MAX) => (c as usize) & MAX_FIXSTR_SIZE,
            STR_8 => self.fetch_u8()?.into(),
            STR_16 => self.fetch_u16()?.into(),
            STR_32 => self.fetch_len32()?,
            _ => return Err(Error::ExpectedString)
        };
        Ok(len)
    }

    /// Decode a string borrowed from the input.
    pub fn decode_str(&mut self) -> Result<&'de str> {
        let len = self.decode_str_len()?;
        Ok(core::str::from_utf8(self.split_input(len)?)?)
    }

    /// Decode a binary blob borrowed from the input.
    pub fn decode_bin(&mut self) -> Result<&'de[u8]> {
        let len: usize = match self.fetch()? {
            BIN_8 => self.fetch_u8()?.into(),
            BIN_16 => self.fetch_u16()?.into(),
            BIN_32 => self.fetch_len32()?,
            _ => return Err(Error::ExpectedBin)
        };
        self.split_input(len)
    }

    /// Decode an array header and return the number of elements that follow.
    pub fn decode_array_len(&mut self) -> Result<usize> {
        let len: usize = match self.fetch()? {
            c@(FIXARRAY..=FIXARRAY_MAX) => (c as usize) & MAX_FIXARRAY_SIZE,
            ARRAY_16 => self.fetch_u16()?.into(),
            ARRAY_32 => self.fetch_len32()?,
            _ => return Err(Error::ExpectedArray)
        };
        Ok(len)
    }

    /// Decode a map header and return the number of key-value pairs that follow.
    pub fn decode_map_len(&mut self) -> Result<usize> {
        let len: usize = match self.fetch()? {
            c@(FIXMAP..=FIXMAP_MAX) => (c as usize) & MAX_FIXMAP_SIZE,
            MAP_16 => self.fetch_u16()?.into(),
            MAP_32 => self.fetch_len32()?,
            _ => return Err(Error::ExpectedMap)
        };
        Ok(len)
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
    /// Decode any MessagePack value.
    ///
    /// Map pairs are kept in their wire order, duplicate keys included.
    pub fn decode_value(&mut self) -> Result<Value> {
        let value = match self.peek()? {
            NIL => {
                self.index += 1;
                Value::Nil
            }
            RESERVED => return Err(Error::ReservedCode),
            FALSE|TRUE => Value::Bool(self.decode_bool()?),
            MIN_POSFIXINT..=MAX_POSFIXINT|
            NEGFIXINT..=0xff|
            UINT_8..=UINT_64|
            INT_8..=INT_64 => match self.decode_integer()?.0 {
                Integer::Signed(n) => Value::Int(n),
                Integer::Unsigned(n) => Value::UInt(n)
            }
            FLOAT_32 => {
                self.index += 1;
                Value::Float32(self.fetch_f32()?)
            }
            FLOAT_64 => {
                self.index += 1;
                Value::Float64(self.fetch_f64()?)
            }
            FIXSTR..=FIXSTR_MAX|
            STR_8|STR_16|STR_32 => Value::Str(String::from(self.decode_str()?)),
            BIN_8|BIN_16|BIN_32 => Value::Bin(Vec::from(self.decode_bin()?)),
            FIXARRAY..=FIXARRAY_MAX|
            ARRAY_16|ARRAY_32 => {
                let len = self.decode_array_len()?;
                self.nested(|de| {
                    // every element takes at least one byte
                    let mut items = Vec::with_capacity(len.min(de.remaining_len()));
                    for _ in 0..len {
                        items.push(de.decode_value().map_err(|err| {
                            trace!(position = de.index, error = %err, "array element failed");
                            err
                        })?);
                    }
                    Ok(Value::Array(items))
                })?
            }
            FIXMAP..=FIXMAP_MAX|
            MAP_16|MAP_32 => {
                let len = self.decode_map_len()?;
                self.nested(|de| {
                    let mut entries = Vec::with_capacity(len.min(de.remaining_len() / 2));
                    for _ in 0..len {
                        let key = de.decode_value().map_err(|err| {
                            trace!(position = de.index, error = %err, "map key failed");
                            err
                        })?;
                        let value = de.decode_value().map_err(|err| {
                            trace!(position = de.index, error = %err, "map value failed");
                            err
                        })?;
                        entries.push((key, value));
                    }
                    Ok(Value::Map(entries))
                })?
            }
            code@(EXT_8..=EXT_32|FIXEXT_1..=FIXEXT_16) => return Err(Error::UnsupportedType(code)),
        };
        Ok(value)
    }

    /// Consume a single MessagePack value from the input without decoding its content.
    ///
    /// Strings are not validated as UTF-8. Containers count towards the
    /// depth limit.
    pub fn skip_value(&mut self) -> Result<()> {
        use MsgType::*;
        let mtyp = match self.fetch()? {
            NIL|
            FALSE|
            TRUE|
            MIN_POSFIXINT..=MAX_POSFIXINT|
            NEGFIXINT..=0xff => Single(0),
            c@(FIXMAP..=FIXMAP_MAX) => Map((c as usize) & MAX_FIXMAP_SIZE),
            c@(FIXARRAY..=FIXARRAY_MAX) => Array((c as usize) & MAX_FIXARRAY_SIZE),
            c@(FIXSTR..=FIXSTR_MAX) => Single((c as usize) & MAX_FIXSTR_SIZE),
            RESERVED => return Err(Error::ReservedCode),
            BIN_8|STR_8 => Single(self.fetch_u8()?.into()),
            BIN_16|STR_16 => Single(self.fetch_u16()?.into()),
            BIN_32|STR_32 => Single(self.fetch_len32()?),
            code@(EXT_8..=EXT_32|FIXEXT_1..=FIXEXT_16) => return Err(Error::UnsupportedType(code)),
            FLOAT_32 => Single(4),
            FLOAT_64 => Single(8),
            UINT_8 => Single(1),
            UINT_16 => Single(2),
            UINT_32 => Single(4),
            UINT_64 => Single(8),
            INT_8 => Single(1),
            INT_16 => Single(2),
            INT_32 => Single(4),
            INT_64 => Single(8),
            ARRAY_16 => Array(self.fetch_u16()?.into()),
            ARRAY_32 => Array(self.fetch_len32()?),
            MAP_16 => Map(self.fetch_u16()?.into()),
            MAP_32 => Map(self.fetch_len32()?),
        };
        match mtyp {
            Single(len) => {
                self.split_input(len)?;
            }
            Array(len) => self.nested(|de| {
                (0..len).try_for_each(|_| de.skip_value())
            })?,
            Map(len) => self.nested(|de| {
                (0..len).try_for_each(|_| {
                    de.skip_value()?;
                    de.skip_value()
                })
            })?
        }
        Ok(())
    }
}
