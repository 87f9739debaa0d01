//! Typed access to flat element buffers.
//!
//! This module provides the [`Reader`], [`Writer`] and [`ElementIter`]
//! capabilities. They are defined once, generically over the [`Element`]
//! type, and the per-datatype names (`Float32Reader`, `Int64Writer`, ...) are
//! generated from that single definition so every call path stays
//! monomorphized and unboxed.
//!
//! Capabilities are independent: an adapter may implement `Reader`, `Writer`
//! or both.

mod cpu;
mod iter;
pub mod utils;

pub use iter::ReaderIter;
pub use utils::{ConstReader, FnReader, FnWriter, Window};

use crate::datatype::{Datatype, Element, Object};
use crate::error::Result;
use std::sync::Arc;

/// Properties shared by every capability over a buffer.
pub trait Access {
    /// Returns the declared logical number of elements.
    fn lsize(&self) -> u64;

    /// Returns the datatype tag of the elements.
    fn datatype(&self) -> Datatype;

    /// Returns `true` if there are no addressable elements.
    fn is_empty(&self) -> bool {
        self.lsize() == 0
    }
}

/// Random read access by logical index.
pub trait Reader<T: Element>: Access {
    /// Reads the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `index >= self.lsize()`.
    fn read(&self, index: u64) -> Result<T>;

    /// Creates a single-pass iterator over this reader.
    fn elements(&self) -> ReaderIter<T, &Self>
    where
        Self: Sized,
    {
        ReaderIter::new(self)
    }
}

/// Random write access by logical index.
pub trait Writer<T: Element>: Access {
    /// Writes `value` at `index`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `index >= self.lsize()`. A failed write leaves
    /// the buffer untouched.
    fn write(&mut self, index: u64, value: T) -> Result<()>;
}

/// Forward-only, single-pass traversal.
pub trait ElementIter<T: Element> {
    fn datatype(&self) -> Datatype;

    fn has_next(&self) -> bool;

    /// Returns the element under the cursor and advances.
    fn next_element(&mut self) -> Result<T>;

    /// Returns the element under the cursor without advancing.
    fn current(&self) -> Result<T>;

    /// Number of elements not yet consumed.
    fn remaining(&self) -> u64;
}

impl<A: Access + ?Sized> Access for &A {
    fn lsize(&self) -> u64 {
        (**self).lsize()
    }

    fn datatype(&self) -> Datatype {
        (**self).datatype()
    }
}

impl<A: Access + ?Sized> Access for &mut A {
    fn lsize(&self) -> u64 {
        (**self).lsize()
    }

    fn datatype(&self) -> Datatype {
        (**self).datatype()
    }
}

impl<A: Access + ?Sized> Access for Box<A> {
    fn lsize(&self) -> u64 {
        (**self).lsize()
    }

    fn datatype(&self) -> Datatype {
        (**self).datatype()
    }
}

impl<A: Access + ?Sized> Access for Arc<A> {
    fn lsize(&self) -> u64 {
        (**self).lsize()
    }

    fn datatype(&self) -> Datatype {
        (**self).datatype()
    }
}

impl<T: Element, R: Reader<T> + ?Sized> Reader<T> for &R {
    fn read(&self, index: u64) -> Result<T> {
        (**self).read(index)
    }
}

impl<T: Element, R: Reader<T> + ?Sized> Reader<T> for &mut R {
    fn read(&self, index: u64) -> Result<T> {
        (**self).read(index)
    }
}

impl<T: Element, R: Reader<T> + ?Sized> Reader<T> for Box<R> {
    fn read(&self, index: u64) -> Result<T> {
        (**self).read(index)
    }
}

impl<T: Element, R: Reader<T> + ?Sized> Reader<T> for Arc<R> {
    fn read(&self, index: u64) -> Result<T> {
        (**self).read(index)
    }
}

impl<T: Element, W: Writer<T> + ?Sized> Writer<T> for &mut W {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        (**self).write(index, value)
    }
}

impl<T: Element, W: Writer<T> + ?Sized> Writer<T> for Box<W> {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        (**self).write(index, value)
    }
}

crate::datatype_family! {
    i8 => Int8Reader, Int8Writer, Int8Iter;
    i16 => Int16Reader, Int16Writer, Int16Iter;
    i32 => Int32Reader, Int32Writer, Int32Iter;
    i64 => Int64Reader, Int64Writer, Int64Iter;
    f32 => Float32Reader, Float32Writer, Float32Iter;
    f64 => Float64Reader, Float64Writer, Float64Iter;
    bool => BooleanReader, BooleanWriter, BooleanIter;
    Object => ObjectReader, ObjectWriter, ObjectIter;
}
