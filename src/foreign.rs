/// Implementations for foreign types
#[cfg(feature = "std")]
use std::{vec::Vec, collections::VecDeque, io::Cursor};
#[cfg(all(feature = "alloc",not(feature = "std")))]
use alloc::{vec::Vec, collections::VecDeque};

#[allow(unused_imports)]
use super::*;

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl PackWrite for Vec<u8> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl PackBuffer for Vec<u8> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    /// Retains the allocated capacity.
    #[inline]
    fn clear(&mut self) {
        Vec::clear(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "std", feature = "alloc"))))]
impl PackWrite for VecDeque<u8> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend(buf.iter().copied());
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push_back(byte);
        Ok(())
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<T> PackWrite for Cursor<T>
    where Cursor<T>: std::io::Write
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        std::io::Write::write_all(self, buf).map_err(|_| WriteError::BufferFull)
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> PackWrite for arrayvec::ArrayVec<u8, CAP> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.try_extend_from_slice(buf).map_err(|_| WriteError::BufferFull)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.try_push(byte).map_err(|_| WriteError::BufferFull)
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> PackBuffer for arrayvec::ArrayVec<u8, CAP> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    #[inline]
    fn clear(&mut self) {
        self.truncate(0)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> PackWrite for heapless::Vec<u8, CAP> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(buf).map_err(|_| WriteError::BufferFull)
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push(byte).map_err(|_| WriteError::BufferFull)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> PackBuffer for heapless::Vec<u8, CAP> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    #[inline]
    fn clear(&mut self) {
        self.truncate(0)
    }
}

#[cfg(feature = "smallvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "smallvec")))]
impl<A: smallvec::Array<Item = u8>> PackWrite for smallvec::SmallVec<A> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(feature = "smallvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "smallvec")))]
impl<A: smallvec::Array<Item = u8>> PackBuffer for smallvec::SmallVec<A> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    #[inline]
    fn clear(&mut self) {
        self.truncate(0)
    }
}

#[cfg(feature = "tinyvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "tinyvec")))]
impl<A: tinyvec::Array<Item = u8>> PackWrite for tinyvec::ArrayVec<A> {
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        if buf.len() > self.capacity() - self.len() {
            return Err(WriteError::BufferFull)
        }
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        match self.try_push(byte) {
            None => Ok(()),
            Some(_) => Err(WriteError::BufferFull)
        }
    }
}

#[cfg(feature = "tinyvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "tinyvec")))]
impl<A: tinyvec::Array<Item = u8>> PackBuffer for tinyvec::ArrayVec<A> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    #[inline]
    fn clear(&mut self) {
        self.truncate(0)
    }
}

#[cfg(all(feature = "tinyvec", any(feature = "std", feature = "alloc")))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "tinyvec", any(feature = "std", feature = "alloc")))))]
impl<A: tinyvec::Array<Item = u8>> PackWrite for tinyvec::TinyVec<A> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(all(feature = "tinyvec", any(feature = "std", feature = "alloc")))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "tinyvec", any(feature = "std", feature = "alloc")))))]
impl<A: tinyvec::Array<Item = u8>> PackBuffer for tinyvec::TinyVec<A> {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
    #[inline]
    fn clear(&mut self) {
        self.truncate(0)
    }
}
