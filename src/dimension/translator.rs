//! Logical-to-physical index translation.
//!
//! A logical index enumerates the elements of the (possibly broadcast) max
//! shape in row-major order. The translator peels one coordinate per
//! dimension off that index with a divide/remainder cascade over the
//! max-shape strides and accumulates each dimension's physical term:
//!
//! ```text
//! physical = base
//! for d in 0..rank:
//!     coord      = remaining / max_shape_stride[d]
//!     remaining  = remaining % max_shape_stride[d]
//!     physical  += term_d(coord)
//! ```
//!
//! A fixed-extent dimension contributes `(coord % extent) * stride`. Broadcast
//! dimensions have a zero stride, so they contribute nothing without a
//! separate branch; repeating dimensions wrap through the remainder. An
//! indexed dimension contributes `reader[coord % reader.len] * stride`,
//! which is how ragged dimensions are supported. The innermost max-shape
//! stride is always 1, so the remaining index is the last coordinate.

use std::sync::Arc;

use super::metadata::ViewMetadata;
use super::shape::{IndexReader, ShapeEntry};
use super::Dimension;
use crate::datatype::{Datatype, Element};
use crate::error::{Result, TensorustError};
use crate::storage::{Access, Reader};

#[derive(Clone)]
enum Term {
    Affine { extent: u64, stride: i64 },
    Indexed { reader: IndexReader, extent: u64, stride: i64 },
}

impl Term {
    #[inline]
    fn offset_of(&self, coord: u64) -> Result<i64> {
        match self {
            Term::Affine { extent, stride } => Ok((coord % extent) as i64 * stride),
            Term::Indexed {
                reader,
                extent,
                stride,
            } => Ok(reader.read(coord % extent)? * stride),
        }
    }
}

#[derive(Clone)]
struct Step {
    divisor: u64,
    term: Term,
}

/// Translates logical element indices of a view into physical buffer
/// indices.
///
/// The translator is a pure function of its metadata. It is also a
/// `Reader<i64>` of length `n_elems`, so it can serve as the indexed
/// dimension of another view.
#[derive(Clone)]
pub struct IndexTranslator {
    metadata: Arc<ViewMetadata>,
    steps: Vec<Step>,
    base: i64,
    n_elems: u64,
}

impl IndexTranslator {
    pub fn new(metadata: impl Into<Arc<ViewMetadata>>) -> Self {
        let metadata = metadata.into();
        let steps = metadata
            .own_shape()
            .entries()
            .iter()
            .zip(metadata.strides())
            .zip(metadata.max_shape_strides())
            .map(|((entry, &stride), &divisor)| {
                let term = match entry {
                    ShapeEntry::Extent(extent) => Term::Affine {
                        extent: *extent,
                        stride,
                    },
                    ShapeEntry::Indexed(reader) => Term::Indexed {
                        extent: reader.lsize(),
                        reader: Arc::clone(reader),
                        stride,
                    },
                };
                Step { divisor, term }
            })
            .collect();

        Self {
            base: metadata.base_offset(),
            n_elems: metadata.n_elems(),
            metadata,
            steps,
        }
    }

    pub fn metadata(&self) -> &Arc<ViewMetadata> {
        &self.metadata
    }

    /// Returns the physical index of logical index `idx`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `idx >= n_elems`.
    pub fn translate(&self, idx: u64) -> Result<i64> {
        if idx >= self.n_elems {
            return Err(TensorustError::out_of_range_u64(idx, self.n_elems));
        }
        self.translate_in_range(idx)
    }

    #[inline]
    fn translate_in_range(&self, idx: u64) -> Result<i64> {
        let mut remaining = idx;
        let mut physical = self.base;
        for step in &self.steps {
            let coord = remaining / step.divisor;
            remaining %= step.divisor;
            physical += step.term.offset_of(coord)?;
        }
        Ok(physical)
    }

    /// Returns the logical index of N-D coordinates over the max shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIndex` if the number of coordinates differs from the
    /// rank, and `IndexOutOfBounds` naming the first offending axis.
    pub fn logical_index(&self, dims: &[i64]) -> Result<u64> {
        let shape = self.metadata.shape();
        if dims.len() != shape.len() {
            return Err(TensorustError::invalid_index(dims.to_vec(), shape.to_vec()));
        }

        let mut idx = 0u64;
        let axes = dims.iter().zip(shape).zip(&self.steps).enumerate();
        for (axis, ((&coord, &bound), step)) in axes {
            let c = u64::try_from(coord)
                .ok()
                .filter(|&c| c < bound)
                .ok_or_else(|| TensorustError::index_out_of_bounds(coord, bound, axis))?;
            idx += c * step.divisor;
        }
        Ok(idx)
    }

    /// Returns the physical index of N-D coordinates over the max shape.
    pub fn translate_coords(&self, dims: &[i64]) -> Result<i64> {
        let idx = self.logical_index(dims)?;
        self.translate_in_range(idx)
    }
}

impl std::fmt::Debug for IndexTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexTranslator")
            .field("shape", &self.metadata.own_shape())
            .field("max_shape", &self.metadata.max_shape())
            .field("base", &self.base)
            .field("n_elems", &self.n_elems)
            .finish()
    }
}

impl Access for IndexTranslator {
    fn lsize(&self) -> u64 {
        self.n_elems
    }

    fn datatype(&self) -> Datatype {
        <i64 as Element>::DATATYPE
    }
}

impl Reader<i64> for IndexTranslator {
    fn read(&self, index: u64) -> Result<i64> {
        self.translate(index)
    }
}

impl From<ViewMetadata> for IndexTranslator {
    fn from(metadata: ViewMetadata) -> Self {
        Self::new(metadata)
    }
}
