//! MessagePack encoder
use core::fmt;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(all(feature = "alloc",not(feature = "std")))]
use alloc::vec::Vec;

use packwire::{PackWrite, PackBuffer, WriteError};

use crate::ieee754;
use crate::magick::*;
use crate::pack::{Pack, PackFields};
use crate::twos::*;

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::value::Value;

/// Encoding result
pub type Result<T> = core::result::Result<T, Error>;

/// Encoding error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The underlying sink is full
    BufferFull,
    /// A string, binary, array or map length does not fit in 32 bits
    SizeExceeded,
    /// A float that is not a finite normal number reached the arithmetic
    /// float encoder (`manual-float` feature)
    UnsupportedFloat,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::BufferFull => "MessagePack output buffer is full",
            Error::SizeExceeded => "Length exceeds the MessagePack 32-bit size limit",
            Error::UnsupportedFloat => "Float value can not be encoded arithmetically",
        })
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::BufferFull => Error::BufferFull,
            _ => Error::BufferFull
        }
    }
}

/// Serialize `value` as a MessagePack message to a [`PackWrite`] implementation.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
    where W: PackWrite, T: Pack + ?Sized
{
    let mut encoder = Encoder::new(writer);
    value.pack(&mut encoder)
}

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
/// Serialize `value` as a MessagePack message to a new vector of bytes.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
    where T: Pack + ?Sized
{
    let mut encoder = Encoder::new(Vec::new());
    value.pack(&mut encoder)?;
    Ok(encoder.into_inner())
}

/// MessagePack encoder.
///
/// * appends to the owned sink `W`, never reading back what it wrote,
/// * encodes every integer using the narrowest format that holds its value,
/// * encodes floats with no fractional part as integers,
/// * refuses lengths that do not fit in 32 bits with [`Error::SizeExceeded`]
///   before writing anything for that value.
///
/// A failed call may leave a partially written value in the sink, e.g. an
/// array header followed by some of its elements.
#[derive(Debug, Default, Clone)]
pub struct Encoder<W> {
    output: W
}

impl<W> Encoder<W> {
    /// Create a new encoder writing to `output`.
    #[inline(always)]
    pub fn new(output: W) -> Self {
        Encoder { output }
    }

    #[inline(always)]
    pub fn get_ref(&self) -> &W {
        &self.output
    }

    #[inline(always)]
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: PackBuffer> Encoder<W> {
    /// Return a view of all bytes encoded so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Discard all encoded bytes.
    #[inline]
    pub fn clear(&mut self) {
        self.output.clear()
    }
}

#[derive(Clone, Copy)]
enum Integral {
    Signed(i64),
    Unsigned(u64),
}

/// 2^63
const I64_END: f64 = 9_223_372_036_854_775_808.0;
/// 2^64
const U64_END: f64 = 18_446_744_073_709_551_616.0;

/// Return the integer equal to `v` if `v` has no fractional part and fits in
/// `i64` or `u64`.
fn integral(v: f64) -> Option<Integral> {
    if (-I64_END..I64_END).contains(&v) {
        let n = v as i64;
        (n as f64 == v).then_some(Integral::Signed(n))
    }
    else if (I64_END..U64_END).contains(&v) {
        // every float of this magnitude is integral
        Some(Integral::Unsigned(v as u64))
    }
    else {
        None
    }
}

#[inline]
fn check_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        debug!(len, "length exceeds MessagePack size limit");
        Error::SizeExceeded
    })
}

impl<W: PackWrite> Encoder<W> {
    /// Encode any [`Pack`] implementation.
    #[inline]
    pub fn encode<T: Pack + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.pack(self)
    }

    /// Encode each field in order, without any container header.
    ///
    /// `fields` is a tuple of references, e.g. `(&a, &b, "c")`.
    #[inline]
    pub fn encode_sequence<F: PackFields>(&mut self, fields: F) -> Result<()> {
        fields.pack_fields(self)
    }

    pub fn encode_nil(&mut self) -> Result<()> {
        Ok(self.output.write_byte(NIL)?)
    }

    pub fn encode_bool(&mut self, v: bool) -> Result<()> {
        Ok(self.output.write_byte(if v { TRUE } else { FALSE })?)
    }

    #[inline]
    pub fn encode_u8(&mut self, v: u8) -> Result<()> {
        self.encode_uint(v.into())
    }

    #[inline]
    pub fn encode_u16(&mut self, v: u16) -> Result<()> {
        self.encode_uint(v.into())
    }

    #[inline]
    pub fn encode_u32(&mut self, v: u32) -> Result<()> {
        self.encode_uint(v.into())
    }

    #[inline]
    pub fn encode_u64(&mut self, v: u64) -> Result<()> {
        self.encode_uint(v)
    }

    /// Encode an unsigned integer as a positive fixint or the narrowest of
    /// `uint 8`, `uint 16`, `uint 32` and `uint 64`.
    pub fn encode_uint(&mut self, v: u64) -> Result<()> {
        if v <= MAX_POSFIXINT as u64 {
            self.output.write_byte(v as u8)?;
        }
        else if let Ok(v) = u8::try_from(v) {
            self.output.write_byte(UINT_8)?;
            self.output.write_byte(v)?;
        }
        else if let Ok(v) = u16::try_from(v) {
            self.output.write_byte(UINT_16)?;
            self.output.write(&v.to_be_bytes())?;
        }
        else if let Ok(v) = u32::try_from(v) {
            self.output.write_byte(UINT_32)?;
            self.output.write(&v.to_be_bytes())?;
        }
        else {
            self.output.write_byte(UINT_64)?;
            self.output.write(&v.to_be_bytes())?;
        }
        Ok(())
    }

    #[inline]
    pub fn encode_i8(&mut self, v: i8) -> Result<()> {
        self.encode_int(v.into())
    }

    #[inline]
    pub fn encode_i16(&mut self, v: i16) -> Result<()> {
        self.encode_int(v.into())
    }

    #[inline]
    pub fn encode_i32(&mut self, v: i32) -> Result<()> {
        self.encode_int(v.into())
    }

    #[inline]
    pub fn encode_i64(&mut self, v: i64) -> Result<()> {
        self.encode_int(v)
    }

    /// Encode a signed integer as a fixint (`-32..=127`) or the narrowest of
    /// `int 8`, `int 16`, `int 32` and `int 64`.
    ///
    /// Each width is checked against its full signed range, `MIN` included,
    /// so `i64::MIN` lands in `int 64` without any magnitude arithmetic.
    pub fn encode_int(&mut self, v: i64) -> Result<()> {
        if FIXINT_I64.contains(&v) {
            self.output.write_byte(to_twos_complement_8(v as i8))?;
        }
        else if (i64::from(i8::MIN)..=i64::from(i8::MAX)).contains(&v) {
            self.output.write_byte(INT_8)?;
            self.output.write_byte(to_twos_complement_8(v as i8))?;
        }
        else if (i64::from(i16::MIN)..=i64::from(i16::MAX)).contains(&v) {
            self.output.write_byte(INT_16)?;
            self.output.write(&to_twos_complement_16(v as i16).to_be_bytes())?;
        }
        else if (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&v) {
            self.output.write_byte(INT_32)?;
            self.output.write(&to_twos_complement_32(v as i32).to_be_bytes())?;
        }
        else {
            self.output.write_byte(INT_64)?;
            self.output.write(&to_twos_complement_64(v).to_be_bytes())?;
        }
        Ok(())
    }

    /// Encode a single precision float.
    ///
    /// Values with no fractional part are encoded as integers.
    pub fn encode_f32(&mut self, v: f32) -> Result<()> {
        if let Some(n) = integral(v.into()) {
            return self.encode_integral(n)
        }
        let bits = ieee754::f32_to_bits(v).ok_or(Error::UnsupportedFloat)?;
        self.output.write_byte(FLOAT_32)?;
        Ok(self.output.write(&bits.to_be_bytes())?)
    }

    /// Encode a double precision float.
    ///
    /// Values with no fractional part are encoded as integers.
    pub fn encode_f64(&mut self, v: f64) -> Result<()> {
        if let Some(n) = integral(v) {
            return self.encode_integral(n)
        }
        let bits = ieee754::f64_to_bits(v).ok_or(Error::UnsupportedFloat)?;
        self.output.write_byte(FLOAT_64)?;
        Ok(self.output.write(&bits.to_be_bytes())?)
    }

    fn encode_integral(&mut self, n: Integral) -> Result<()> {
        match n {
            Integral::Signed(n) => self.encode_int(n),
            Integral::Unsigned(n) => self.encode_uint(n)
        }
    }

    /// Encode a string, its bytes written verbatim.
    pub fn encode_str(&mut self, v: &str) -> Result<()> {
        self.encode_str_len(v.len())?;
        Ok(self.output.write_str(v)?)
    }

    /// Encode a binary blob. Binary data has no inline form.
    pub fn encode_bin(&mut self, v: &[u8]) -> Result<()> {
        let size = check_len(v.len())?;
        if let Ok(size) = u8::try_from(size) {
            self.output.write_byte(BIN_8)?;
            self.output.write_byte(size)?;
        }
        else if let Ok(size) = u16::try_from(size) {
            self.output.write_byte(BIN_16)?;
            self.output.write(&size.to_be_bytes())?;
        }
        else {
            self.output.write_byte(BIN_32)?;
            self.output.write(&size.to_be_bytes())?;
        }
        Ok(self.output.write(v)?)
    }

    /// Write a string header for a string of `len` bytes.
    pub fn encode_str_len(&mut self, len: usize) -> Result<()> {
        let len = check_len(len)?;
        if len <= MAX_FIXSTR_SIZE as u32 {
            self.output.write_byte(FIXSTR | (len as u8))?;
        }
        else if let Ok(len) = u8::try_from(len) {
            self.output.write_byte(STR_8)?;
            self.output.write_byte(len)?;
        }
        else if let Ok(len) = u16::try_from(len) {
            self.output.write_byte(STR_16)?;
            self.output.write(&len.to_be_bytes())?;
        }
        else {
            self.output.write_byte(STR_32)?;
            self.output.write(&len.to_be_bytes())?;
        }
        Ok(())
    }

    /// Write an array header for `len` elements.
    ///
    /// The caller must encode exactly `len` values next.
    pub fn encode_array_len(&mut self, len: usize) -> Result<()> {
        let len = check_len(len)?;
        if len <= MAX_FIXARRAY_SIZE as u32 {
            self.output.write_byte(FIXARRAY | (len as u8))?;
        }
        else if let Ok(len) = u16::try_from(len) {
            self.output.write_byte(ARRAY_16)?;
            self.output.write(&len.to_be_bytes())?;
        }
        else {
            self.output.write_byte(ARRAY_32)?;
            self.output.write(&len.to_be_bytes())?;
        }
        Ok(())
    }

    /// Write a map header for `len` key-value pairs.
    ///
    /// The caller must encode exactly `len` keys, each followed by its value.
    pub fn encode_map_len(&mut self, len: usize) -> Result<()> {
        let len = check_len(len)?;
        if len <= MAX_FIXMAP_SIZE as u32 {
            self.output.write_byte(FIXMAP | (len as u8))?;
        }
        else if let Ok(len) = u16::try_from(len) {
            self.output.write_byte(MAP_16)?;
            self.output.write(&len.to_be_bytes())?;
        }
        else {
            self.output.write_byte(MAP_32)?;
            self.output.write(&len.to_be_bytes())?;
        }
        Ok(())
    }

    /// Encode an array from a slice, elements in slice order.
    pub fn encode_array<T: Pack>(&mut self, items: &[T]) -> Result<()> {
        self.encode_array_iter(items)
    }

    /// Encode an array from an iterator of known length, elements in iteration order.
    pub fn encode_array_iter<'a, T, I>(&mut self, items: I) -> Result<()>
        where T: Pack + ?Sized + 'a,
              I: IntoIterator<Item = &'a T>,
              I::IntoIter: ExactSizeIterator
    {
        let mut items = items.into_iter();
        self.encode_array_len(items.len())?;
        items.try_for_each(|item| item.pack(self))
    }

    /// Encode a map from key-value pairs, in iteration order.
    ///
    /// Keys are neither sorted nor checked for duplicates.
    pub fn encode_map<'a, K, V, I>(&mut self, entries: I) -> Result<()>
        where K: Pack + ?Sized + 'a,
              V: Pack + ?Sized + 'a,
              I: IntoIterator<Item = (&'a K, &'a V)>,
              I::IntoIter: ExactSizeIterator
    {
        let entries = entries.into_iter();
        self.encode_map_len(entries.len())?;
        for (k, v) in entries {
            k.pack(self)?;
            v.pack(self)?;
        }
        Ok(())
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
    /// Encode a [`Value`] tree.
    pub fn encode_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Nil => self.encode_nil(),
            Value::Bool(v) => self.encode_bool(*v),
            Value::Int(v) => self.encode_int(*v),
            Value::UInt(v) => self.encode_uint(*v),
            Value::Float32(v) => self.encode_f32(*v),
            Value::Float64(v) => self.encode_f64(*v),
            Value::Str(v) => self.encode_str(v),
            Value::Bin(v) => self.encode_bin(v),
            Value::Array(items) => self.encode_array(items),
            Value::Map(entries) => {
                self.encode_map(entries.iter().map(|(k, v)| (k, v)))
            }
        }
    }
}
