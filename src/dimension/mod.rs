//! Dimension system for tensor views.
//!
//! This module provides the shape and stride types, the validated
//! [`ViewMetadata`] block, and the [`IndexTranslator`] that maps logical
//! element indices to physical buffer indices, including broadcast and
//! indexed (ragged) dimensions.

pub mod metadata;
pub mod shape;
pub mod stride;
pub mod translator;

pub use metadata::{ViewDescriptor, ViewMetadata, ViewMetadataBuilder};
pub use shape::{IndexReader, Shape, ShapeEntry};
pub use stride::Stride;
pub use translator::IndexTranslator;

/// A trait for types that carry a tensor view's dimensions.
pub trait Dimension {
    /// Returns the effective (broadcast) shape.
    fn shape(&self) -> &[u64];

    /// Returns the per-dimension strides.
    fn strides(&self) -> &[i64];

    /// Returns the number of dimensions.
    fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Returns the total number of logical elements.
    fn n_elems(&self) -> u64 {
        self.shape().iter().product()
    }

    /// Returns `true` if logical order matches a dense row-major buffer.
    fn is_contiguous(&self) -> bool {
        self.strides() == Stride::row_major(self.shape()).as_slice()
    }
}
