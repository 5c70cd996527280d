//! Types that know how to encode and decode themselves.
//!
//! [`Pack`] and [`Unpack`] connect Rust types to the scalar and container
//! operations of [`Encoder`] and [`Decoder`]. [`PackFields`] and
//! [`UnpackFields`] are implemented for tuples of 1 to 12 references, which is
//! how an aggregate hands its fields to [`Encoder::encode_sequence`] and
//! [`Decoder::decode_sequence`] in a fixed order.
#[cfg(feature = "std")]
use std::{
    vec::Vec,
    string::String,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque}
};

#[cfg(all(feature = "alloc",not(feature = "std")))]
use alloc::{
    vec::Vec,
    string::String,
    collections::{BTreeMap, BTreeSet, LinkedList, VecDeque}
};

#[cfg(feature = "std")]
use core::hash::{Hash, BuildHasher};

use packwire::PackWrite;

use crate::encode::{self, Encoder};
use crate::decode::{self, Decoder};
use crate::magick::NIL;

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::value::Value;

/// A type that can be written with an [`Encoder`].
pub trait Pack {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()>;
}

/// A type that can be read with a [`Decoder`], possibly borrowing from its input.
pub trait Unpack<'de>: Sized {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self>;
}

/// Binary data wrapper.
///
/// Byte containers are encoded as MessagePack arrays of integers by their
/// element impls. Wrap them in `Bin` to encode them as a `bin` instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bin<B>(pub B);

impl<B> Bin<B> {
    pub fn into_inner(self) -> B {
        self.0
    }
}

impl<B: AsRef<[u8]>> AsRef<[u8]> for Bin<B> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<T: Pack + ?Sized> Pack for &T {
    #[inline]
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        (**self).pack(encoder)
    }
}

impl<T: Pack + ?Sized> Pack for &mut T {
    #[inline]
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        (**self).pack(encoder)
    }
}

impl Pack for () {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_nil()
    }
}

impl<'de> Unpack<'de> for () {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_nil()
    }
}

impl Pack for bool {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_bool(*self)
    }
}

impl<'de> Unpack<'de> for bool {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_bool()
    }
}

macro_rules! impl_integers {
    ($($ty:ty: $encode:ident),*) => {$(
        impl Pack for $ty {
            #[inline]
            fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
                encoder.$encode(*self)
            }
        }

        impl<'de> Unpack<'de> for $ty {
            #[inline]
            fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
                decoder.decode_int()
            }
        }
    )*};
}

impl_integers!(u8: encode_u8, u16: encode_u16, u32: encode_u32, u64: encode_u64,
               i8: encode_i8, i16: encode_i16, i32: encode_i32, i64: encode_i64);

impl Pack for f32 {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_f32(*self)
    }
}

impl<'de> Unpack<'de> for f32 {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_f32()
    }
}

impl Pack for f64 {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_f64(*self)
    }
}

impl<'de> Unpack<'de> for f64 {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_f64()
    }
}

impl Pack for str {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_str(self)
    }
}

impl<'de> Unpack<'de> for &'de str {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_str()
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl Pack for String {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_str(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de> Unpack<'de> for String {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_str().map(String::from)
    }
}

/// `None` is `nil`.
impl<T: Pack> Pack for Option<T> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        match self {
            Some(value) => value.pack(encoder),
            None => encoder.encode_nil()
        }
    }
}

impl<'de, T: Unpack<'de>> Unpack<'de> for Option<T> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        if decoder.peek()? == NIL {
            decoder.decode_nil()?;
            Ok(None)
        }
        else {
            T::unpack(decoder).map(Some)
        }
    }
}

impl<B: AsRef<[u8]>> Pack for Bin<B> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_bin(self.0.as_ref())
    }
}

impl<'de> Unpack<'de> for Bin<&'de [u8]> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_bin().map(Bin)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de> Unpack<'de> for Bin<Vec<u8>> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_bin().map(|bytes| Bin(bytes.into()))
    }
}

impl<T: Pack> Pack for [T] {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array(self)
    }
}

impl<T: Pack, const N: usize> Pack for [T; N] {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<T: Pack> Pack for Vec<T> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de, T: Unpack<'de>> Unpack<'de> for Vec<T> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        let len = decoder.decode_array_len()?;
        let mut items = Vec::with_capacity(len.min(decoder.remaining_len()));
        for _ in 0..len {
            items.push(T::unpack(decoder)?);
        }
        Ok(items)
    }
}

/// The array must hold exactly `N` elements, otherwise `Error::ExpectedArray`
/// is returned.
#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de, T: Unpack<'de>, const N: usize> Unpack<'de> for [T; N] {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        if decoder.decode_array_len()? != N {
            return Err(decode::Error::ExpectedArray)
        }
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::unpack(decoder)?);
        }
        items.try_into().map_err(|_| decode::Error::ExpectedArray)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<T: Pack> Pack for VecDeque<T> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array_iter(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de, T: Unpack<'de>> Unpack<'de> for VecDeque<T> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        Vec::<T>::unpack(decoder).map(VecDeque::from)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<T: Pack> Pack for LinkedList<T> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array_iter(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de, T: Unpack<'de>> Unpack<'de> for LinkedList<T> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        let len = decoder.decode_array_len()?;
        let mut list = LinkedList::new();
        for _ in 0..len {
            list.push_back(T::unpack(decoder)?);
        }
        Ok(list)
    }
}

/// A set is an array of its elements in iteration order.
#[cfg(any(feature = "std", feature = "alloc"))]
impl<T: Pack> Pack for BTreeSet<T> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array_iter(self)
    }
}

/// An element repeated on the wire is kept once.
#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de, T: Unpack<'de> + Ord> Unpack<'de> for BTreeSet<T> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        let len = decoder.decode_array_len()?;
        let mut set = BTreeSet::new();
        for _ in 0..len {
            set.insert(T::unpack(decoder)?);
        }
        Ok(set)
    }
}

#[cfg(feature = "std")]
impl<T: Pack, S> Pack for HashSet<T, S> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array_iter(self)
    }
}

/// An element repeated on the wire is kept once.
#[cfg(feature = "std")]
impl<'de, T, S> Unpack<'de> for HashSet<T, S>
    where T: Unpack<'de> + Eq + Hash, S: BuildHasher + Default
{
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        let len = decoder.decode_array_len()?;
        let capacity = len.min(decoder.remaining_len());
        let mut set = HashSet::with_capacity_and_hasher(capacity, S::default());
        for _ in 0..len {
            set.insert(T::unpack(decoder)?);
        }
        Ok(set)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<K: Pack, V: Pack> Pack for BTreeMap<K, V> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_map(self)
    }
}

/// A key repeated on the wire overwrites the value of its earlier occurrence.
#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de, K, V> Unpack<'de> for BTreeMap<K, V>
    where K: Unpack<'de> + Ord, V: Unpack<'de>
{
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        let len = decoder.decode_map_len()?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = K::unpack(decoder)?;
            let value = V::unpack(decoder)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "std")]
impl<K: Pack, V: Pack, S> Pack for HashMap<K, V, S> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_map(self)
    }
}

/// A key repeated on the wire overwrites the value of its earlier occurrence.
#[cfg(feature = "std")]
impl<'de, K, V, S> Unpack<'de> for HashMap<K, V, S>
    where K: Unpack<'de> + Eq + Hash, V: Unpack<'de>, S: BuildHasher + Default
{
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        let len = decoder.decode_map_len()?;
        let capacity = len.min(decoder.remaining_len() / 2);
        let mut map = HashMap::with_capacity_and_hasher(capacity, S::default());
        for _ in 0..len {
            let key = K::unpack(decoder)?;
            let value = V::unpack(decoder)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl Pack for Value {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_value(self)
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl<'de> Unpack<'de> for Value {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        decoder.decode_value()
    }
}

/// An ordered group of fields encoded one after another with no container header.
pub trait PackFields {
    fn pack_fields<W: PackWrite>(self, encoder: &mut Encoder<W>) -> encode::Result<()>;
}

/// An ordered group of fields decoded one after another with no container header.
pub trait UnpackFields<'de> {
    fn unpack_fields(self, decoder: &mut Decoder<'de>) -> decode::Result<()>;
}

macro_rules! impl_fields {
    ($($name:ident)+) => {
        impl<$($name: Pack + ?Sized),+> PackFields for ($(&$name,)+) {
            #[allow(non_snake_case)]
            fn pack_fields<W: PackWrite>(self, encoder: &mut Encoder<W>) -> encode::Result<()> {
                let ($($name,)+) = self;
                $($name.pack(encoder)?;)+
                Ok(())
            }
        }

        impl<'de, $($name: Unpack<'de>),+> UnpackFields<'de> for ($(&mut $name,)+) {
            #[allow(non_snake_case)]
            fn unpack_fields(self, decoder: &mut Decoder<'de>) -> decode::Result<()> {
                let ($($name,)+) = self;
                $(*$name = Unpack::unpack(decoder)?;)+
                Ok(())
            }
        }
    };
}

impl_fields!(A);
impl_fields!(A B);
impl_fields!(A B C);
impl_fields!(A B C D);
impl_fields!(A B C D E);
impl_fields!(A B C D E F);
impl_fields!(A B C D E F G);
impl_fields!(A B C D E F G H);
impl_fields!(A B C D E F G H I);
impl_fields!(A B C D E F G H I J);
impl_fields!(A B C D E F G H I J K);
impl_fields!(A B C D E F G H I J K L);
