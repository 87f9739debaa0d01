//! Stride handling for tensor views.
//!
//! Strides are signed element steps per unit increase of a coordinate. A
//! zero stride repeats the same physical element along that dimension, which
//! is how broadcasting is expressed; a negative stride traverses in reverse.

use crate::error::{Result, TensorustError};

/// Represents the strides of a tensor view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Stride {
    strides: Vec<i64>,
}

impl Stride {
    /// Creates a new stride from a vector of strides.
    pub fn new(strides: Vec<i64>) -> Self {
        Self { strides }
    }

    /// Returns the stride values as a slice.
    pub fn as_slice(&self) -> &[i64] {
        &self.strides
    }

    /// Computes the default row-major strides for a given shape.
    pub fn row_major(shape: &[u64]) -> Self {
        Self {
            strides: row_major_u64(shape).into_iter().map(|s| s as i64).collect(),
        }
    }

    /// Broadcasts the stride of a view with `shape` to `target`.
    ///
    /// Dimensions are aligned from the right. New leading dimensions and
    /// size-1 dimensions stretched to a larger target get a zero stride.
    pub fn broadcast_to(&self, shape: &[u64], target: &[u64]) -> Result<Self> {
        if shape.len() != self.strides.len() || target.len() < self.strides.len() {
            return Err(TensorustError::malformed(format!(
                "cannot broadcast strides {:?} of shape {shape:?} to {target:?}",
                self.strides
            )));
        }

        let offset = target.len() - self.strides.len();
        let mut new_strides = vec![0; target.len()];

        for i in offset..target.len() {
            let dim = shape[i - offset];
            new_strides[i] = if dim == 1 && target[i] != 1 {
                0
            } else {
                self.strides[i - offset]
            };
        }

        Ok(Self {
            strides: new_strides,
        })
    }
}

/// Row-major strides used to decompose a logical index over `shape`.
pub fn row_major_u64(shape: &[u64]) -> Vec<u64> {
    let ndim = shape.len();
    let mut strides = vec![0u64; ndim];

    if ndim > 0 {
        strides[ndim - 1] = 1;
        for i in (0..ndim - 1).rev() {
            strides[i] = strides[i + 1].wrapping_mul(shape[i + 1]);
        }
    }

    strides
}

impl From<Vec<i64>> for Stride {
    fn from(strides: Vec<i64>) -> Self {
        Self { strides }
    }
}

impl From<&[i64]> for Stride {
    fn from(strides: &[i64]) -> Self {
        Self {
            strides: strides.to_vec(),
        }
    }
}

impl From<Stride> for Vec<i64> {
    fn from(stride: Stride) -> Self {
        stride.strides
    }
}
