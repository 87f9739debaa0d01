//! Reader and writer capabilities over in-memory slices and vectors.

use super::{Access, Reader, Writer};
use crate::datatype::{Datatype, Element};
use crate::error::{Result, TensorustError};

#[inline]
fn slot(index: u64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| TensorustError::out_of_range_u64(index, len as u64))
}

impl<T: Element> Access for [T] {
    fn lsize(&self) -> u64 {
        self.len() as u64
    }

    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }
}

impl<T: Element> Reader<T> for [T] {
    fn read(&self, index: u64) -> Result<T> {
        let i = slot(index, self.len())?;
        Ok(self[i].clone())
    }
}

impl<T: Element> Writer<T> for [T] {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        let i = slot(index, self.len())?;
        self[i] = value;
        Ok(())
    }
}

impl<T: Element> Access for Vec<T> {
    fn lsize(&self) -> u64 {
        self.as_slice().lsize()
    }

    fn datatype(&self) -> Datatype {
        T::DATATYPE
    }
}

impl<T: Element> Reader<T> for Vec<T> {
    fn read(&self, index: u64) -> Result<T> {
        self.as_slice().read(index)
    }
}

impl<T: Element> Writer<T> for Vec<T> {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        self.as_mut_slice().write(index, value)
    }
}
