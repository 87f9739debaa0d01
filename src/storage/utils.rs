//! Buffer adapters: sub-ranges, constant and computed readers, write sinks.

use std::fmt;
use std::marker::PhantomData;

use super::{Access, Reader, Writer};
use crate::datatype::{Datatype, Element};
use crate::error::{Result, TensorustError};

/// A contiguous sub-range `[start, start + len)` of another buffer.
///
/// The window's declared size is `len`; construction fails if the range does
/// not fit inside the wrapped buffer, so writes can never land outside it.
#[derive(Debug, Clone)]
pub struct Window<B> {
    inner: B,
    start: u64,
    len: u64,
}

impl<B: Access> Window<B> {
    pub fn new(inner: B, start: u64, len: u64) -> Result<Self> {
        let end = start
            .checked_add(len)
            .ok_or_else(|| TensorustError::malformed("window range overflows"))?;
        if end > inner.lsize() {
            return Err(TensorustError::malformed(format!(
                "window [{start}, {end}) exceeds buffer of size {}",
                inner.lsize()
            )));
        }
        Ok(Self { inner, start, len })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn physical(&self, index: u64) -> Result<u64> {
        if index >= self.len {
            return Err(TensorustError::out_of_range_u64(index, self.len));
        }
        Ok(self.start + index)
    }
}

impl<B: Access> Access for Window<B> {
    fn lsize(&self) -> u64 {
        self.len
    }

    fn datatype(&self) -> Datatype {
        self.inner.datatype()
    }
}

impl<T: Element, B: Reader<T>> Reader<T> for Window<B> {
    fn read(&self, index: u64) -> Result<T> {
        self.inner.read(self.physical(index)?)
    }
}

impl<T: Element, B: Writer<T>> Writer<T> for Window<B> {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        let physical = self.physical(index)?;
        self.inner.write(physical, value)
    }
}

/// A reader returning the same value at every index.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstReader<T> {
    value: T,
    len: u64,
}

impl<T: Element> ConstReader<T> {
    pub fn new(value: T, len: u64) -> Self {
        Self { value, len }
    }
}

impl<T: Element> Access for ConstReader<T> {
    fn lsize(&self) -> u64 {
        self.len
    }

    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }
}

impl<T: Element> Reader<T> for ConstReader<T> {
    fn read(&self, index: u64) -> Result<T> {
        if index >= self.len {
            return Err(TensorustError::out_of_range_u64(index, self.len));
        }
        Ok(self.value.clone())
    }
}

/// A virtual reader computing each element from its index.
pub struct FnReader<T, F> {
    len: u64,
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnReader<T, F>
where
    T: Element,
    F: Fn(u64) -> T,
{
    pub fn new(len: u64, f: F) -> Self {
        Self {
            len,
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, F> fmt::Debug for FnReader<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReader").field("len", &self.len).finish()
    }
}

impl<T: Element, F: Fn(u64) -> T> Access for FnReader<T, F> {
    fn lsize(&self) -> u64 {
        self.len
    }

    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }
}

impl<T: Element, F: Fn(u64) -> T> Reader<T> for FnReader<T, F> {
    fn read(&self, index: u64) -> Result<T> {
        if index >= self.len {
            return Err(TensorustError::out_of_range_u64(index, self.len));
        }
        Ok((self.f)(index))
    }
}

/// A write-only sink forwarding each in-range write to a closure.
pub struct FnWriter<T, F> {
    len: u64,
    f: F,
    _marker: PhantomData<fn(T)>,
}

impl<T, F> FnWriter<T, F>
where
    T: Element,
    F: FnMut(u64, T),
{
    pub fn new(len: u64, f: F) -> Self {
        Self {
            len,
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, F> fmt::Debug for FnWriter<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWriter").field("len", &self.len).finish()
    }
}

impl<T: Element, F: FnMut(u64, T)> Access for FnWriter<T, F> {
    fn lsize(&self) -> u64 {
        self.len
    }

    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }
}

impl<T: Element, F: FnMut(u64, T)> Writer<T> for FnWriter<T, F> {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        if index >= self.len {
            return Err(TensorustError::out_of_range_u64(index, self.len));
        }
        (self.f)(index, value);
        Ok(())
    }
}
