#![allow(missing_docs)]

//! Parse binary data
//!
//! This module is the only place where untrusted bytes are interpreted as integers. Every read is
//! bounds checked against the `ReadScope` it is made from, and a read that fails leaves the
//! `ReadCtxt` where it was.

use crate::binary::{I16Be, U16Be, U32Be};
use crate::error::ParseError;
use crate::size;
use std::cmp::Ordering;
use std::marker::PhantomData;

#[derive(Debug, Copy, Clone)]
pub struct ReadEof {}

/// A view onto a range of bytes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReadScope<'a> {
    data: &'a [u8],
}

/// A cursor over a `ReadScope`.
#[derive(Clone)]
pub struct ReadCtxt<'a> {
    scope: ReadScope<'a>,
    offset: usize,
}

pub trait ReadBinary {
    type HostType<'a>: Sized; // default = Self

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError>;
}

pub trait ReadBinaryDep {
    type Args<'a>: Copy;
    type HostType<'a>: Sized; // default = Self

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        args: Self::Args<'a>,
    ) -> Result<Self::HostType<'a>, ParseError>;
}

/// Read will always succeed if sufficient bytes are available.
pub trait ReadUnchecked {
    type HostType: Sized; // default = Self

    /// The number of bytes consumed by `read_unchecked`.
    const SIZE: usize;

    /// Must read exactly `SIZE` bytes.
    /// Unsafe as it avoids prohibitively expensive per-byte bounds checking.
    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> Self::HostType;
}

pub trait ReadFrom {
    type ReadType: ReadUnchecked;
    fn read_from(value: <Self::ReadType as ReadUnchecked>::HostType) -> Self;
}

impl<T> ReadUnchecked for T
where
    T: ReadFrom,
{
    type HostType = T;

    const SIZE: usize = T::ReadType::SIZE;

    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> Self::HostType {
        let t = T::ReadType::read_unchecked(ctxt);
        T::read_from(t)
    }
}

impl<T> ReadBinary for T
where
    T: ReadUnchecked,
{
    type HostType<'a> = T::HostType;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        ctxt.check_avail(T::SIZE)?;
        Ok(unsafe { T::read_unchecked(ctxt) })
        // Safe because we have `SIZE` bytes available.
    }
}

impl<T> ReadBinaryDep for T
where
    T: ReadBinary,
{
    type Args<'a> = ();
    type HostType<'a> = T::HostType<'a>;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (): Self::Args<'_>,
    ) -> Result<Self::HostType<'a>, ParseError> {
        T::read(ctxt)
    }
}

/// A fixed-length array of `T` read from a scope, with items `stride` bytes apart.
pub struct ReadArray<'a, T: ReadUnchecked> {
    scope: ReadScope<'a>,
    length: usize,
    stride: usize,
    phantom: PhantomData<T>,
}

pub struct ReadArrayIter<'a, T: ReadUnchecked> {
    scope: ReadScope<'a>,
    index: usize,
    stride: usize,
    phantom: PhantomData<T>,
}

impl<'a> ReadScope<'a> {
    pub fn new(data: &'a [u8]) -> ReadScope<'a> {
        ReadScope { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn offset(&self, offset: usize) -> ReadScope<'a> {
        let data = self.data.get(offset..).unwrap_or(&[]);
        ReadScope { data }
    }

    pub fn offset_length(&self, offset: usize, length: usize) -> Result<ReadScope<'a>, ParseError> {
        if offset < self.data.len() || length == 0 {
            let data = self.data.get(offset..).unwrap_or(&[]);
            if length <= data.len() {
                let data = &data[0..length];
                Ok(ReadScope { data })
            } else {
                Err(ParseError::BadEof)
            }
        } else {
            Err(ParseError::BadOffset)
        }
    }

    pub fn ctxt(&self) -> ReadCtxt<'a> {
        ReadCtxt::new(*self)
    }
}

impl<'a> ReadCtxt<'a> {
    /// ReadCtxt is constructed by calling `ReadScope::ctxt`.
    fn new(scope: ReadScope<'a>) -> ReadCtxt<'a> {
        ReadCtxt { scope, offset: 0 }
    }

    pub fn check(&self, cond: bool) -> Result<(), ParseError> {
        match cond {
            true => Ok(()),
            false => Err(ParseError::BadValue),
        }
    }

    /// Check a condition, returning `ParseError::BadIndex` if `false`.
    pub fn check_index(&self, cond: bool) -> Result<(), ParseError> {
        match cond {
            true => Ok(()),
            false => Err(ParseError::BadIndex),
        }
    }

    /// Check a condition, returning `ParseError::BadVersion` if `false`.
    ///
    /// Intended for use in checking versions read from data. Example:
    ///
    /// ```
    /// use sfntsan::binary::read::ReadScope;
    /// use sfntsan::error::ParseError;
    ///
    /// let scope = ReadScope::new(&[0, 2]);
    /// let mut ctxt = scope.ctxt();
    /// let major_version = ctxt.read_u16be().expect("unable to read version");
    ///
    /// assert!(ctxt.check_version(major_version == 2).is_ok());
    /// assert_eq!(ctxt.check_version(major_version == 1), Err(ParseError::BadVersion));
    /// ```
    pub fn check_version(&self, cond: bool) -> Result<(), ParseError> {
        match cond {
            true => Ok(()),
            false => Err(ParseError::BadVersion),
        }
    }

    /// Check a condition, returning `ParseError::BadOffset` if `false`.
    pub fn check_offset(&self, cond: bool) -> Result<(), ParseError> {
        match cond {
            true => Ok(()),
            false => Err(ParseError::BadOffset),
        }
    }

    /// The number of bytes consumed so far, relative to the start of the underlying scope.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn read<T: ReadBinaryDep<Args<'a> = ()>>(&mut self) -> Result<T::HostType<'a>, ParseError> {
        T::read_dep(self, ())
    }

    fn check_avail(&self, length: usize) -> Result<(), ReadEof> {
        match self.offset.checked_add(length) {
            Some(endpos) if endpos <= self.scope.data.len() => Ok(()),
            _ => Err(ReadEof {}),
        }
    }

    /// Advance the cursor by `length` bytes without interpreting them.
    pub fn skip(&mut self, length: usize) -> Result<(), ReadEof> {
        self.check_avail(length)?;
        self.offset += length;
        Ok(())
    }

    unsafe fn read_unchecked_u8(&mut self) -> u8 {
        let byte = *self.scope.data.get_unchecked(self.offset);
        self.offset += 1;
        byte
    }

    unsafe fn read_unchecked_u16be(&mut self) -> u16 {
        let hi = u16::from(*self.scope.data.get_unchecked(self.offset));
        let lo = u16::from(*self.scope.data.get_unchecked(self.offset + 1));
        self.offset += 2;
        (hi << 8) | lo
    }

    unsafe fn read_unchecked_i16be(&mut self) -> i16 {
        self.read_unchecked_u16be() as i16
    }

    unsafe fn read_unchecked_u32be(&mut self) -> u32 {
        let b0 = u32::from(*self.scope.data.get_unchecked(self.offset));
        let b1 = u32::from(*self.scope.data.get_unchecked(self.offset + 1));
        let b2 = u32::from(*self.scope.data.get_unchecked(self.offset + 2));
        let b3 = u32::from(*self.scope.data.get_unchecked(self.offset + 3));
        self.offset += 4;
        (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadEof> {
        self.check_avail(1)?;
        Ok(unsafe { self.read_unchecked_u8() })
        // Safe because we have 1 byte available.
    }

    pub fn read_u16be(&mut self) -> Result<u16, ReadEof> {
        self.check_avail(2)?;
        Ok(unsafe { self.read_unchecked_u16be() })
        // Safe because we have 2 bytes available.
    }

    pub fn read_u32be(&mut self) -> Result<u32, ReadEof> {
        self.check_avail(4)?;
        Ok(unsafe { self.read_unchecked_u32be() })
        // Safe because we have 4 bytes available.
    }

    pub fn read_array<T: ReadUnchecked>(
        &mut self,
        length: usize,
    ) -> Result<ReadArray<'a, T>, ParseError> {
        let byte_len = length
            .checked_mul(T::SIZE)
            .ok_or(ParseError::LimitExceeded)?;
        let scope = self.read_scope(byte_len)?;
        Ok(ReadArray {
            scope,
            length,
            stride: T::SIZE,
            phantom: PhantomData,
        })
    }

    pub fn read_array_stride<T: ReadUnchecked>(
        &mut self,
        length: usize,
        stride: usize,
    ) -> Result<ReadArray<'a, T>, ParseError> {
        if T::SIZE > stride {
            return Err(ParseError::BadValue);
        }
        let byte_len = length
            .checked_mul(stride)
            .ok_or(ParseError::LimitExceeded)?;
        let scope = self.read_scope(byte_len)?;
        Ok(ReadArray {
            scope,
            length,
            stride,
            phantom: PhantomData,
        })
    }

    pub fn read_scope(&mut self, length: usize) -> Result<ReadScope<'a>, ReadEof> {
        if let Ok(scope) = self.scope.offset_length(self.offset, length) {
            self.offset += length;
            Ok(scope)
        } else {
            Err(ReadEof {})
        }
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], ReadEof> {
        let scope = self.read_scope(length)?;
        Ok(scope.data)
    }
}

impl<'a, T: ReadUnchecked> ReadArray<'a, T> {
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn get_item(&self, index: usize) -> Option<T::HostType> {
        if index < self.length {
            let offset = index * self.stride;
            let scope = self.scope.offset_length(offset, self.stride).ok()?;
            let mut ctxt = scope.ctxt();
            // Safe because we have `stride` bytes available and `T::SIZE` is <= `stride`.
            Some(unsafe { T::read_unchecked(&mut ctxt) })
        } else {
            None
        }
    }

    pub fn iter(&self) -> ReadArrayIter<'a, T> {
        ReadArrayIter {
            scope: self.scope,
            index: 0,
            stride: self.stride,
            phantom: PhantomData,
        }
    }

    // This is derived from the function on slice in the standard library
    pub fn binary_search_by<F>(&self, mut f: F) -> Result<usize, usize>
    where
        F: FnMut(T::HostType) -> Ordering,
    {
        // INVARIANTS:
        // - 0 <= left <= left + size = right <= self.len()
        // - f returns Less for everything in self[..left]
        // - f returns Greater for everything in self[right..]
        let mut size = self.len();
        let mut left = 0;
        let mut right = size;
        while left < right {
            let mid = left + size / 2;

            // `mid < self.len()` so the item is always present.
            let cmp = match self.get_item(mid) {
                Some(item) => f(item),
                None => return Err(left),
            };

            if cmp == Ordering::Less {
                left = mid + 1;
            } else if cmp == Ordering::Greater {
                right = mid;
            } else {
                return Ok(mid);
            }

            size = right - left;
        }

        Err(left)
    }
}

impl<'a, T: ReadUnchecked> Iterator for ReadArrayIter<'a, T> {
    type Item = T::HostType;

    fn next(&mut self) -> Option<T::HostType> {
        let mut ctxt = self.scope.offset(self.index * self.stride).ctxt();
        ctxt.check_avail(self.stride).ok()?;
        // SAFETY: Ok because we have (at least) `stride` bytes available and T::SIZE is <= stride.
        self.index += 1;
        Some(unsafe { T::read_unchecked(&mut ctxt) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let consumed = self.index * self.stride;
        let remaining = self.scope.data().len().saturating_sub(consumed) / self.stride.max(1);
        (remaining, Some(remaining))
    }
}

impl<'a, T: ReadUnchecked> ExactSizeIterator for ReadArrayIter<'a, T> {}

impl<'a, T: ReadUnchecked> Clone for ReadArrayIter<'a, T> {
    fn clone(&self) -> Self {
        ReadArrayIter {
            scope: self.scope,
            index: self.index,
            stride: self.stride,
            phantom: PhantomData,
        }
    }
}

impl ReadUnchecked for U16Be {
    type HostType = u16;

    const SIZE: usize = size::U16;

    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> u16 {
        ctxt.read_unchecked_u16be()
    }
}

impl ReadUnchecked for I16Be {
    type HostType = i16;

    const SIZE: usize = size::I16;

    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> i16 {
        ctxt.read_unchecked_i16be()
    }
}

impl ReadUnchecked for U32Be {
    type HostType = u32;

    const SIZE: usize = size::U32;

    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> u32 {
        ctxt.read_unchecked_u32be()
    }
}

impl<T1, T2> ReadUnchecked for (T1, T2)
where
    T1: ReadUnchecked,
    T2: ReadUnchecked,
{
    type HostType = (T1::HostType, T2::HostType);

    const SIZE: usize = T1::SIZE + T2::SIZE;

    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> Self::HostType {
        let t1 = T1::read_unchecked(ctxt);
        let t2 = T2::read_unchecked(ctxt);
        (t1, t2)
    }
}

impl<T1, T2, T3> ReadUnchecked for (T1, T2, T3)
where
    T1: ReadUnchecked,
    T2: ReadUnchecked,
    T3: ReadUnchecked,
{
    type HostType = (T1::HostType, T2::HostType, T3::HostType);

    const SIZE: usize = T1::SIZE + T2::SIZE + T3::SIZE;

    unsafe fn read_unchecked<'a>(ctxt: &mut ReadCtxt<'a>) -> Self::HostType {
        let t1 = T1::read_unchecked(ctxt);
        let t2 = T2::read_unchecked(ctxt);
        let t3 = T3::read_unchecked(ctxt);
        (t1, t2, t3)
    }
}
