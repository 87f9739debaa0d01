//! Single-pass iteration over a reader.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::{ElementIter, Reader};
use crate::datatype::{Datatype, Element};
use crate::error::{Result, TensorustError};

/// A forward-only cursor over a [`Reader`].
///
/// The length is captured once at construction; the iterator is exhausted
/// after that many elements and is never reset.
#[derive(Debug)]
pub struct ReaderIter<T, R> {
    reader: R,
    cursor: u64,
    total: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Element, R: Reader<T>> ReaderIter<T, R> {
    pub fn new(reader: R) -> Self {
        let total = reader.lsize();
        Self {
            reader,
            cursor: 0,
            total,
            _marker: PhantomData,
        }
    }

    /// Number of elements consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<T: Element, R: Reader<T>> ElementIter<T> for ReaderIter<T, R> {
    fn datatype(&self) -> Datatype {
        self.reader.datatype()
    }

    fn has_next(&self) -> bool {
        self.cursor < self.total
    }

    fn next_element(&mut self) -> Result<T> {
        let value = self.current()?;
        self.cursor += 1;
        Ok(value)
    }

    fn current(&self) -> Result<T> {
        if !self.has_next() {
            return Err(TensorustError::exhausted(self.total));
        }
        self.reader.read(self.cursor)
    }

    fn remaining(&self) -> u64 {
        self.total - self.cursor
    }
}

impl<T: Element, R: Reader<T>> Iterator for ReaderIter<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        let item = self.reader.read(self.cursor);
        self.cursor += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<T: Element, R: Reader<T>> ExactSizeIterator for ReaderIter<T, R> {}

impl<T: Element, R: Reader<T>> FusedIterator for ReaderIter<T, R> {}
