//! Byte sinks for compact binary encoders.
//!
//! Encoders write their output to implementations of [`PackWrite`]. Sinks that
//! keep the whole output in memory and can hand it back also implement
//! [`PackBuffer`].
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc",not(feature = "std")))]
extern crate alloc;

use core::fmt;

mod foreign;

pub type WriteResult<T> = Result<T, WriteError>;

/// An error returned by [`PackWrite`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WriteError {
    /// Buffer is full
    BufferFull,
}

#[cfg(feature = "std")]
impl std::error::Error for WriteError {}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::BufferFull => f.write_str("buffer is full"),
        }
    }
}

/// Encoders should write data to the implementations of this trait.
///
/// Writes are append-only: nothing already written is ever read back or
/// modified through this trait.
pub trait PackWrite {
    /// Write all bytes from `buf` to the internal buffer.
    ///
    /// When over capacity return `Err(WriteError::BufferFull)`.
    fn write(&mut self, buf: &[u8]) -> WriteResult<()>;
    /// Write a single `byte` to the internal buffer.
    ///
    /// When over capacity return `Err(WriteError::BufferFull)`.
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.write(core::slice::from_ref(&byte))
    }
    /// Write a string to the internal buffer.
    ///
    /// When over capacity return `Err(WriteError::BufferFull)`.
    #[inline]
    fn write_str(&mut self, s: &str) -> WriteResult<()> {
        self.write(s.as_bytes())
    }
}

impl<T: PackWrite + ?Sized> PackWrite for &'_ mut T {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        (**self).write(buf)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        (**self).write_byte(byte)
    }
}

/// A [`PackWrite`] keeping all written bytes in a contiguous memory region.
pub trait PackBuffer: PackWrite {
    /// Return all bytes written since creation or the last [`PackBuffer::clear`].
    fn as_bytes(&self) -> &[u8];
    /// Discard all written bytes.
    ///
    /// Whether the capacity is retained depends on the implementation.
    fn clear(&mut self);
}

impl<T: PackBuffer + ?Sized> PackBuffer for &'_ mut T {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        (**self).as_bytes()
    }
    #[inline]
    fn clear(&mut self) {
        (**self).clear()
    }
}

/// A fixed-capacity writer over a borrowed slice
#[derive(Debug, PartialEq)]
pub struct SliceWriter<'a> {
    pub buf: &'a mut [u8],
    pub len: usize
}

impl AsRef<[u8]> for SliceWriter<'_> {
    /// Returns a populated portion of the slice
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl AsMut<[u8]> for SliceWriter<'_> {
    /// Returns a populated portion of the slice
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }
}

impl<'a> SliceWriter<'a> {
    /// Create new instance
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceWriter { buf, len: 0 }
    }
    /// Return populated length
    pub fn len(&self) -> usize {
        self.len
    }
    /// Return `true` if nothing was written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Return total capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
    /// Return remaining capacity
    pub fn rem_capacity(&self) -> usize {
        self.buf.len() - self.len
    }
    /// Reset the populated length to 0, keeping the underlying buffer
    pub fn clear(&mut self) {
        self.len = 0;
    }
    /// Split the underlying buffer and return the portion of the populated buffer
    /// with an underlying buffer's borrowed lifetime.
    ///
    /// Once a SliceWriter is dropped the slice stays borrowed as long as an original container lives.
    pub fn split(self) -> (&'a mut[u8], Self) {
        let (res, buf) = self.buf.split_at_mut(self.len);
        (res, Self { buf, len: 0 })
    }
    /// Destruct into an underlying buffer
    pub fn into_buf(self) -> &'a mut [u8] {
        self.buf
    }
}

impl PackWrite for SliceWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        let end = self.len + buf.len();
        match self.buf.get_mut(self.len..end) {
            Some(chunk) => {
                chunk.copy_from_slice(buf);
                self.len = end;
                Ok(())
            }
            None => Err(WriteError::BufferFull)
        }
    }
}

impl PackBuffer for SliceWriter<'_> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_ref()
    }
    #[inline]
    fn clear(&mut self) {
        SliceWriter::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_writer() {
        let mut buf = [0u8;22];
        let mut writer = SliceWriter::new(&mut buf[..]);
        assert!(writer.is_empty());
        writer.write(b"Hello World!").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_str("Good Bye!").unwrap();
        let expected = b"Hello World! Good Bye!";
        assert_eq!(writer.as_ref(), expected);
        assert_eq!(writer.rem_capacity(), 0);
        let (head, mut writer) = writer.split();
        assert_eq!(head, expected);
        assert_eq!(writer.write_byte(b' ').unwrap_err(), WriteError::BufferFull);
    }

    #[test]
    fn test_slice_writer_buffer() {
        let mut buf = [0u8;4];
        let mut writer = SliceWriter::new(&mut buf[..]);
        writer.write(&[0xc3, 0xc2]).unwrap();
        assert_eq!(PackBuffer::as_bytes(&writer), &[0xc3, 0xc2]);
        assert_eq!(writer.write(&[0, 1, 2]), Err(WriteError::BufferFull));
        // a failed write leaves previous content intact
        assert_eq!(writer.len(), 2);
        PackBuffer::clear(&mut writer);
        assert!(writer.is_empty());
        assert_eq!(writer.capacity(), 4);
        writer.write(&[0, 1, 2, 3]).unwrap();
        assert_eq!(writer.as_ref(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_write_through_mut_ref() {
        fn put<W: PackBuffer>(mut w: W) {
            w.write_byte(0x92).unwrap();
            w.write_str("ab").unwrap();
            assert_eq!(w.as_bytes(), b"\x92ab");
        }
        let mut buf = [0u8;3];
        let mut writer = SliceWriter::new(&mut buf[..]);
        put(&mut writer);
        assert_eq!(writer.as_ref(), b"\x92ab");
    }

    #[test]
    fn test_write_error_display() {
        struct Buf([u8; 16], usize);
        impl fmt::Write for Buf {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                let end = self.1 + s.len();
                self.0.get_mut(self.1..end).ok_or(fmt::Error)?.copy_from_slice(s.as_bytes());
                self.1 = end;
                Ok(())
            }
        }
        let mut buf = Buf([0; 16], 0);
        fmt::write(&mut buf, format_args!("{}", WriteError::BufferFull)).unwrap();
        assert_eq!(&buf.0[..buf.1], b"buffer is full");
    }
}
