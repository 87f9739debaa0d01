//! Dimensioned tensor views.
//!
//! A [`TensorView`] pairs an [`IndexTranslator`] with a buffer it borrows or
//! owns. Every access translates a logical index (or N-D coordinates) into a
//! physical index and forwards it to the buffer's reader or writer.

use std::sync::Arc;

use num_traits::ToPrimitive;

use crate::datatype::{Datatype, Element};
use crate::dimension::{Dimension, IndexTranslator, ViewMetadata};
use crate::error::{Result, TensorustError};
use crate::storage::{Access, Reader, Writer};

/// N-D read access on top of a logical [`Reader`].
pub trait TensorReader<T: Element>: Reader<T> {
    /// Reads the element at `(row, col)` of a rank-2 view.
    fn read2d(&self, row: i64, col: i64) -> Result<T>;

    /// Reads the element at the given coordinates, one per dimension.
    fn read_at(&self, dims: &[i64]) -> Result<T>;
}

/// N-D write access on top of a logical [`Writer`].
pub trait TensorWriter<T: Element>: Writer<T> {
    fn write2d(&mut self, row: i64, col: i64, value: T) -> Result<()>;

    fn write_at(&mut self, dims: &[i64], value: T) -> Result<()>;
}

/// A view of a flat buffer through shape, stride and offset metadata.
#[derive(Debug, Clone)]
pub struct TensorView<B> {
    translator: IndexTranslator,
    buffer: B,
}

impl<B: Access> TensorView<B> {
    /// Creates a view of `buffer` described by `metadata`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMetadata` if any physical index the metadata can
    /// produce falls outside the buffer.
    pub fn new(metadata: impl Into<Arc<ViewMetadata>>, buffer: B) -> Result<Self> {
        let translator = IndexTranslator::new(metadata);
        let size = buffer.lsize();

        if let Some((lo, hi)) = translator.metadata().physical_range() {
            let fits = lo >= 0 && hi.to_u64().map_or(false, |hi| hi < size);
            if !fits {
                tracing::warn!(
                    "view reaches physical range [{lo}, {hi}] outside buffer of size {size}"
                );
                return Err(TensorustError::malformed(format!(
                    "physical range [{lo}, {hi}] exceeds buffer of size {size}"
                )));
            }
        }

        tracing::debug!(
            datatype = %buffer.datatype(),
            n_elems = translator.lsize(),
            buffer_size = size,
            "tensor view created"
        );
        Ok(Self { translator, buffer })
    }

    /// Creates a dense row-major view with the given extents.
    pub fn with_shape(extents: &[u64], buffer: B) -> Result<Self> {
        Self::new(ViewMetadata::contiguous(extents)?, buffer)
    }

    pub fn translator(&self) -> &IndexTranslator {
        &self.translator
    }

    pub fn metadata(&self) -> &Arc<ViewMetadata> {
        self.translator.metadata()
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }

    /// Creates another view over the same buffer with new metadata.
    pub fn reshaped(&self, metadata: impl Into<Arc<ViewMetadata>>) -> Result<TensorView<&B>> {
        TensorView::new(metadata, &self.buffer)
    }

    fn to_buffer_index(&self, physical: i64) -> Result<u64> {
        physical
            .to_u64()
            .ok_or_else(|| TensorustError::out_of_range(physical, self.buffer.lsize()))
    }

    fn physical(&self, idx: u64) -> Result<u64> {
        self.to_buffer_index(self.translator.translate(idx)?)
    }

    fn physical_at(&self, dims: &[i64]) -> Result<u64> {
        self.to_buffer_index(self.translator.translate_coords(dims)?)
    }

    fn physical_2d(&self, row: i64, col: i64) -> Result<u64> {
        if self.ndim() != 2 {
            return Err(TensorustError::invalid_index(
                vec![row, col],
                self.shape().to_vec(),
            ));
        }
        self.physical_at(&[row, col])
    }
}

impl<B: Access> Dimension for TensorView<B> {
    fn shape(&self) -> &[u64] {
        self.metadata().shape()
    }

    fn strides(&self) -> &[i64] {
        self.metadata().strides()
    }

    fn n_elems(&self) -> u64 {
        self.translator.lsize()
    }

    fn is_contiguous(&self) -> bool {
        self.metadata().is_contiguous()
    }
}

impl<B: Access> Access for TensorView<B> {
    fn lsize(&self) -> u64 {
        self.translator.lsize()
    }

    fn datatype(&self) -> Datatype {
        self.buffer.datatype()
    }
}

impl<T: Element, B: Reader<T>> Reader<T> for TensorView<B> {
    fn read(&self, index: u64) -> Result<T> {
        self.buffer.read(self.physical(index)?)
    }
}

impl<T: Element, B: Writer<T>> Writer<T> for TensorView<B> {
    fn write(&mut self, index: u64, value: T) -> Result<()> {
        let physical = self.physical(index)?;
        self.buffer.write(physical, value)
    }
}

impl<T: Element, B: Reader<T>> TensorReader<T> for TensorView<B> {
    fn read2d(&self, row: i64, col: i64) -> Result<T> {
        self.buffer.read(self.physical_2d(row, col)?)
    }

    fn read_at(&self, dims: &[i64]) -> Result<T> {
        self.buffer.read(self.physical_at(dims)?)
    }
}

impl<T: Element, B: Writer<T>> TensorWriter<T> for TensorView<B> {
    fn write2d(&mut self, row: i64, col: i64, value: T) -> Result<()> {
        let physical = self.physical_2d(row, col)?;
        self.buffer.write(physical, value)
    }

    fn write_at(&mut self, dims: &[i64], value: T) -> Result<()> {
        let physical = self.physical_at(dims)?;
        self.buffer.write(physical, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;
    use crate::storage::Window;

    #[test]
    fn test_tensor_view() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = TensorView::with_shape(&[2, 3], &data).unwrap();

        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.strides(), &[3, 1]);
        assert_eq!(view.read_at(&[0, 0]).unwrap(), 1.0);
        assert_eq!(view.read_at(&[0, 1]).unwrap(), 2.0);
        assert_eq!(view.read2d(1, 0).unwrap(), 4.0);
        assert_eq!(view.read2d(1, 2).unwrap(), 6.0);
        assert_eq!(view.read(5).unwrap(), 6.0);
        assert_eq!(view.datatype(), Datatype::Float32);
    }

    #[test]
    fn test_transposed_view() {
        let data = vec![1i32, 2, 3, 4, 5, 6];
        let meta = ViewMetadata::builder([3, 2]).strides(vec![1, 3]).build().unwrap();
        let view = TensorView::new(meta, data.as_slice()).unwrap();
        assert_eq!(view.read2d(0, 1).unwrap(), 4);
        assert_eq!(view.read2d(2, 0).unwrap(), 3);
        assert!(!view.is_contiguous());
    }

    #[test]
    fn test_ragged_trailing_dimension() {
        let data: Vec<i64> = (0..22).collect();
        let meta = ViewMetadata::builder(shape![3, @vec![10i64, 11, 12, 13]])
            .strides(vec![4, 1])
            .build()
            .unwrap();
        let view = TensorView::new(meta, &data).unwrap();
        assert_eq!(view.read(5).unwrap(), 15);
        assert_eq!(view.read2d(1, 1).unwrap(), 15);
        assert_eq!(view.read2d(2, 3).unwrap(), 21);
    }

    #[test]
    fn test_bounds_errors() {
        let data = vec![0i8; 6];
        let view = TensorView::with_shape(&[2, 3], &data).unwrap();
        assert_eq!(
            view.read_at(&[2, 0]),
            Err(TensorustError::IndexOutOfBounds(2, 2, 0))
        );
        assert_eq!(
            view.read2d(0, 3),
            Err(TensorustError::IndexOutOfBounds(3, 3, 1))
        );
        assert!(matches!(
            view.read_at(&[1]),
            Err(TensorustError::InvalidIndex(_, _))
        ));
        assert!(matches!(
            view.read(6),
            Err(TensorustError::OutOfRange { index: 6, size: 6 })
        ));
        // Still usable after errors.
        assert_eq!(view.read(5).unwrap(), 0);
    }

    #[test]
    fn test_read2d_requires_rank_two() {
        let data = vec![1i16, 2, 3];
        let view = TensorView::with_shape(&[3], &data).unwrap();
        assert!(matches!(
            view.read2d(0, 0),
            Err(TensorustError::InvalidIndex(_, _))
        ));
    }

    #[test]
    fn test_metadata_must_fit_buffer() {
        let data = vec![0.0f64; 5];
        assert!(matches!(
            TensorView::with_shape(&[2, 3], &data),
            Err(TensorustError::MalformedMetadata(_))
        ));

        let meta = ViewMetadata::builder([3]).strides(vec![-1]).build().unwrap();
        assert!(TensorView::new(meta, &data).is_err());
    }

    #[test]
    fn test_writer() {
        let mut data = vec![0i64; 6];
        {
            let meta = ViewMetadata::builder([2, 3]).strides(vec![1, 2]).build().unwrap();
            let mut view = TensorView::new(meta, &mut data).unwrap();
            view.write2d(0, 1, 10).unwrap();
            view.write_at(&[1, 2], 20).unwrap();
            view.write(0, 30).unwrap();
            assert!(view.write(6, 40).is_err());
            assert!(view.write2d(2, 0, 50).is_err());
            assert_eq!(view.read2d(0, 1).unwrap(), 10);
        }
        assert_eq!(data, vec![30, 0, 10, 0, 0, 20]);
    }

    #[test]
    fn test_view_over_window() {
        let mut data = vec![0i32; 10];
        {
            let window = Window::new(&mut data, 4, 4).unwrap();
            let mut view = TensorView::with_shape(&[2, 2], window).unwrap();
            view.write2d(1, 1, 9).unwrap();
        }
        assert_eq!(data[7], 9);
    }

    #[test]
    fn test_reshaped() {
        let data = vec![1i32, 2, 3, 4, 5, 6];
        let view = TensorView::with_shape(&[6], data).unwrap();
        let matrix = view
            .reshaped(ViewMetadata::contiguous(&[3, 2]).unwrap())
            .unwrap();
        assert_eq!(matrix.read2d(2, 1).unwrap(), 6);
        assert_eq!(view.into_inner().len(), 6);
    }
}
