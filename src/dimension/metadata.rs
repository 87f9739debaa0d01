//! Validated, immutable view metadata.
//!
//! [`ViewMetadataBuilder`] fills in defaults, checks every cross-field
//! invariant once, and produces a [`ViewMetadata`] that translators and views
//! share read-only. A view that needs a different shape, stride or offset is
//! built from new metadata rather than by mutating an existing block.

use serde::{Deserialize, Serialize};

use super::shape::{Shape, ShapeEntry};
use super::stride::{row_major_u64, Stride};
use super::Dimension;
use crate::error::{Result, TensorustError};
use crate::storage::{Access, Reader};

/// Shape, strides, offsets and broadcast metadata of one tensor view.
#[derive(Debug, Clone)]
pub struct ViewMetadata {
    shape: Shape,
    strides: Stride,
    offsets: Vec<i64>,
    max_shape: Vec<u64>,
    max_shape_strides: Vec<u64>,
    scalar_offset: i64,
    base_offset: i64,
    n_elems: u64,
    physical_range: Option<(i64, i64)>,
}

impl ViewMetadata {
    pub fn builder(shape: impl Into<Shape>) -> ViewMetadataBuilder {
        ViewMetadataBuilder::new(shape.into())
    }

    /// Row-major metadata over a dense buffer of the given extents.
    pub fn contiguous(extents: &[u64]) -> Result<Self> {
        Self::builder(extents).build()
    }

    /// Rank-0 metadata addressing the single element at `offset`.
    pub fn scalar(offset: i64) -> Result<Self> {
        Self::builder(Shape::scalar()).base_offset(offset).build()
    }

    /// The view's own dimension entries, before broadcasting.
    pub fn own_shape(&self) -> &Shape {
        &self.shape
    }

    pub fn stride(&self) -> &Stride {
        &self.strides
    }

    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    pub fn max_shape(&self) -> &[u64] {
        &self.max_shape
    }

    pub fn max_shape_strides(&self) -> &[u64] {
        &self.max_shape_strides
    }

    /// The scalar offset added to every physical index, with the
    /// per-dimension offsets already folded in.
    pub fn base_offset(&self) -> i64 {
        self.base_offset
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Inclusive `(min, max)` of every physical index the view can produce,
    /// or `None` if the view has no elements.
    pub fn physical_range(&self) -> Option<(i64, i64)> {
        self.physical_range
    }

    /// Returns `true` if any dimension repeats to reach its max extent.
    pub fn is_broadcast(&self) -> bool {
        self.shape
            .entries()
            .iter()
            .zip(&self.max_shape)
            .any(|(entry, &max)| entry.extent() != max)
    }

    /// Returns a serializable descriptor, or `None` if the shape contains
    /// indexed dimensions.
    pub fn descriptor(&self) -> Option<ViewDescriptor> {
        if self.shape.has_indexed() {
            return None;
        }
        Some(ViewDescriptor {
            shape: self.shape.extents(),
            strides: Some(self.strides.as_slice().to_vec()),
            offsets: Some(self.offsets.clone()),
            max_shape: Some(self.max_shape.clone()),
            max_shape_strides: Some(self.max_shape_strides.clone()),
            base_offset: self.scalar_offset,
            broadcast_to: None,
        })
    }
}

impl Dimension for ViewMetadata {
    fn shape(&self) -> &[u64] {
        &self.max_shape
    }

    fn strides(&self) -> &[i64] {
        self.strides.as_slice()
    }

    fn n_elems(&self) -> u64 {
        self.n_elems
    }

    fn is_contiguous(&self) -> bool {
        !self.shape.has_indexed()
            && !self.is_broadcast()
            && self.base_offset == 0
            && self.strides == Stride::row_major(&self.max_shape)
    }
}

/// Builder for [`ViewMetadata`].
///
/// Unset fields default to row-major strides over the own shape, zero
/// offsets, a max shape equal to the own extents, and row-major max-shape
/// strides.
#[derive(Debug, Clone)]
pub struct ViewMetadataBuilder {
    shape: Shape,
    strides: Option<Vec<i64>>,
    offsets: Option<Vec<i64>>,
    max_shape: Option<Vec<u64>>,
    max_shape_strides: Option<Vec<u64>>,
    base_offset: i64,
    broadcast: Option<Vec<u64>>,
}

impl ViewMetadataBuilder {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            strides: None,
            offsets: None,
            max_shape: None,
            max_shape_strides: None,
            base_offset: 0,
            broadcast: None,
        }
    }

    pub fn strides(mut self, strides: impl Into<Vec<i64>>) -> Self {
        self.strides = Some(strides.into());
        self
    }

    /// Per-dimension offsets in coordinate units.
    pub fn offsets(mut self, offsets: impl Into<Vec<i64>>) -> Self {
        self.offsets = Some(offsets.into());
        self
    }

    pub fn max_shape(mut self, max_shape: impl Into<Vec<u64>>) -> Self {
        self.max_shape = Some(max_shape.into());
        self
    }

    pub fn max_shape_strides(mut self, max_shape_strides: impl Into<Vec<u64>>) -> Self {
        self.max_shape_strides = Some(max_shape_strides.into());
        self
    }

    /// Scalar offset added to every physical index.
    pub fn base_offset(mut self, offset: i64) -> Self {
        self.base_offset = offset;
        self
    }

    /// Broadcasts the view to `target`, aligning dimensions from the right.
    ///
    /// Missing leading dimensions are added with extent 1 and stride 0, and
    /// the max shape becomes `target`.
    pub fn broadcast_to(mut self, target: impl Into<Vec<u64>>) -> Self {
        self.broadcast = Some(target.into());
        self
    }

    pub fn build(self) -> Result<ViewMetadata> {
        let result = self.build_inner();
        if let Err(err) = &result {
            tracing::warn!("rejected view metadata: {err}");
        }
        result
    }

    fn build_inner(self) -> Result<ViewMetadata> {
        let mut shape = self.shape;
        let own_extents = shape.extents();
        let mut strides = self
            .strides
            .unwrap_or_else(|| Stride::row_major(&own_extents).into());
        let mut offsets = self.offsets.unwrap_or_else(|| vec![0; own_extents.len()]);
        check_len("strides", strides.len(), own_extents.len())?;
        check_len("offsets", offsets.len(), own_extents.len())?;

        let mut max_shape = self.max_shape;
        if let Some(target) = self.broadcast {
            if max_shape.is_some() {
                return Err(TensorustError::malformed(
                    "broadcast_to cannot be combined with an explicit max shape",
                ));
            }
            if !shape.is_broadcast_compatible(&target) {
                return Err(TensorustError::malformed(format!(
                    "cannot broadcast shape {shape} to {target:?}"
                )));
            }
            strides = Stride::from(strides)
                .broadcast_to(&own_extents, &target)?
                .into();
            let mut padded = vec![0; target.len() - offsets.len()];
            padded.append(&mut offsets);
            offsets = padded;
            shape.pad_to_rank(target.len());
            max_shape = Some(target);
        }

        let rank = shape.rank();
        let extents = shape.extents();
        let max_shape = max_shape.unwrap_or_else(|| extents.clone());
        let max_shape_strides = self
            .max_shape_strides
            .unwrap_or_else(|| row_major_u64(&max_shape));
        check_len("max shape", max_shape.len(), rank)?;
        check_len("max shape strides", max_shape_strides.len(), rank)?;

        let n_elems = max_shape.iter().try_fold(1u64, |acc, &n| acc.checked_mul(n));
        let n_elems = n_elems
            .ok_or_else(|| TensorustError::malformed(format!("element count of {max_shape:?} overflows")))?;
        check_max_shape_strides(&max_shape, &max_shape_strides, n_elems)?;

        for (d, (&extent, &max)) in extents.iter().zip(&max_shape).enumerate() {
            if max != 0 && (extent == 0 || max % extent != 0) {
                return Err(TensorustError::malformed(format!(
                    "dimension {d} of extent {extent} cannot cover max extent {max}"
                )));
            }
            let repeated_affine = extent == 1 && max > 1 && !shape.entries()[d].is_indexed();
            if repeated_affine && strides[d] != 0 {
                tracing::debug!(
                    "normalizing stride {} of broadcast dimension {d} to zero",
                    strides[d]
                );
                strides[d] = 0;
            }
        }

        let folded = offsets
            .iter()
            .zip(&strides)
            .try_fold(self.base_offset, |acc, (&offset, &stride)| {
                offset.checked_mul(stride).and_then(|v| acc.checked_add(v))
            })
            .ok_or_else(|| TensorustError::malformed("base offset overflows"))?;

        let physical_range = if n_elems == 0 {
            None
        } else {
            Some(physical_range(&shape, &strides, folded)?)
        };

        tracing::debug!(
            rank,
            n_elems,
            ?physical_range,
            "view metadata built for shape {shape}"
        );

        Ok(ViewMetadata {
            shape,
            strides: Stride::new(strides),
            offsets,
            max_shape,
            max_shape_strides,
            scalar_offset: self.base_offset,
            base_offset: folded,
            n_elems,
            physical_range,
        })
    }
}

fn check_len(what: &str, len: usize, rank: usize) -> Result<()> {
    if len != rank {
        return Err(TensorustError::malformed(format!(
            "{what} has {len} entries for a rank-{rank} shape"
        )));
    }
    Ok(())
}

/// Max-shape strides must decompose a logical index exactly: non-increasing,
/// row-major over the max shape, and `n_elems == max_shape[0] * strides[0]`.
/// A zero extent yields zero strides, so ordering is only checked for
/// non-empty views.
fn check_max_shape_strides(max_shape: &[u64], strides: &[u64], n_elems: u64) -> Result<()> {
    if n_elems > 0 && strides.windows(2).any(|w| w[0] < w[1]) {
        return Err(TensorustError::malformed(format!(
            "max shape strides {strides:?} are not non-increasing"
        )));
    }
    if strides != row_major_u64(max_shape).as_slice() {
        return Err(TensorustError::malformed(format!(
            "max shape strides {strides:?} do not match max shape {max_shape:?}"
        )));
    }
    if let (Some(&lead), Some(&lead_stride)) = (max_shape.first(), strides.first()) {
        if lead.checked_mul(lead_stride) != Some(n_elems) {
            return Err(TensorustError::malformed(format!(
                "element count {n_elems} differs from {lead} * {lead_stride}"
            )));
        }
    }
    Ok(())
}

/// Inclusive bounds of the physical indices reachable through `shape`.
fn physical_range(shape: &Shape, strides: &[i64], base: i64) -> Result<(i64, i64)> {
    let overflow = || TensorustError::malformed("physical index range overflows");
    let (mut lo, mut hi) = (base, base);

    for (entry, &stride) in shape.entries().iter().zip(strides) {
        let (term_lo, term_hi) = match entry {
            ShapeEntry::Extent(extent) => {
                let last = i64::try_from(extent - 1)
                    .ok()
                    .and_then(|c| c.checked_mul(stride))
                    .ok_or_else(overflow)?;
                (last.min(0), last.max(0))
            }
            ShapeEntry::Indexed(reader) => {
                let mut bounds = (i64::MAX, i64::MIN);
                for i in 0..reader.lsize() {
                    let term = reader.read(i)?.checked_mul(stride).ok_or_else(overflow)?;
                    bounds = (bounds.0.min(term), bounds.1.max(term));
                }
                bounds
            }
        };
        lo = lo.checked_add(term_lo).ok_or_else(overflow)?;
        hi = hi.checked_add(term_hi).ok_or_else(overflow)?;
    }

    Ok((lo, hi))
}

/// Serializable description of a view over fixed-extent dimensions.
///
/// Omitted fields take the builder defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub shape: Vec<u64>,
    #[serde(default)]
    pub strides: Option<Vec<i64>>,
    #[serde(default)]
    pub offsets: Option<Vec<i64>>,
    #[serde(default)]
    pub max_shape: Option<Vec<u64>>,
    #[serde(default)]
    pub max_shape_strides: Option<Vec<u64>>,
    #[serde(default)]
    pub base_offset: i64,
    #[serde(default)]
    pub broadcast_to: Option<Vec<u64>>,
}

impl TryFrom<ViewDescriptor> for ViewMetadata {
    type Error = TensorustError;

    fn try_from(desc: ViewDescriptor) -> Result<Self> {
        let mut builder = ViewMetadata::builder(desc.shape).base_offset(desc.base_offset);
        if let Some(strides) = desc.strides {
            builder = builder.strides(strides);
        }
        if let Some(offsets) = desc.offsets {
            builder = builder.offsets(offsets);
        }
        if let Some(max_shape) = desc.max_shape {
            builder = builder.max_shape(max_shape);
        }
        if let Some(max_shape_strides) = desc.max_shape_strides {
            builder = builder.max_shape_strides(max_shape_strides);
        }
        if let Some(target) = desc.broadcast_to {
            builder = builder.broadcast_to(target);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    #[test]
    fn test_defaults() {
        let meta = ViewMetadata::contiguous(&[2, 3, 4]).unwrap();
        assert_eq!(meta.shape(), &[2, 3, 4]);
        assert_eq!(meta.strides(), &[12, 4, 1]);
        assert_eq!(meta.max_shape_strides(), &[12, 4, 1]);
        assert_eq!(meta.n_elems(), 24);
        assert_eq!(meta.physical_range(), Some((0, 23)));
        assert!(meta.is_contiguous());
        assert!(!meta.is_broadcast());
    }

    #[test]
    fn test_scalar() {
        let meta = ViewMetadata::scalar(7).unwrap();
        assert_eq!(meta.rank(), 0);
        assert_eq!(meta.n_elems(), 1);
        assert_eq!(meta.physical_range(), Some((7, 7)));
    }

    #[test]
    fn test_offsets_fold_into_base() {
        let meta = ViewMetadata::builder([2, 2])
            .strides(vec![10, 1])
            .offsets(vec![1, 3])
            .base_offset(2)
            .build()
            .unwrap();
        assert_eq!(meta.base_offset(), 2 + 10 + 3);
        assert_eq!(meta.physical_range(), Some((15, 26)));
    }

    #[test]
    fn test_negative_strides_range() {
        let meta = ViewMetadata::builder([3])
            .strides(vec![-1])
            .base_offset(2)
            .build()
            .unwrap();
        assert_eq!(meta.physical_range(), Some((0, 2)));
    }

    #[test]
    fn test_broadcast_to() {
        let meta = ViewMetadata::builder([3, 1])
            .broadcast_to(vec![2, 3, 4])
            .build()
            .unwrap();
        assert_eq!(meta.own_shape().extents(), vec![1, 3, 1]);
        assert_eq!(meta.strides(), &[0, 1, 0]);
        assert_eq!(meta.shape(), &[2, 3, 4]);
        assert_eq!(meta.n_elems(), 24);
        assert!(meta.is_broadcast());
        assert!(!meta.is_contiguous());
    }

    #[test]
    fn test_broadcast_stride_normalized() {
        let meta = ViewMetadata::builder([1, 4])
            .strides(vec![4, 1])
            .max_shape(vec![3, 4])
            .build()
            .unwrap();
        assert_eq!(meta.strides(), &[0, 1]);
    }

    #[test]
    fn test_repeating_view_is_not_contiguous() {
        // Row-major strides over the max shape, but the rows wrap: 16 logical
        // elements cover only 8 physical ones.
        let meta = ViewMetadata::builder([2, 4])
            .max_shape(vec![4, 4])
            .build()
            .unwrap();
        assert_eq!(meta.strides(), &[4, 1]);
        assert_eq!(meta.n_elems(), 16);
        assert_eq!(meta.physical_range(), Some((0, 7)));
        assert!(meta.is_broadcast());
        assert!(!meta.is_contiguous());
    }

    #[test]
    fn test_indexed_range() {
        let meta = ViewMetadata::builder(shape![3, @vec![10i64, 11, 12, 13]])
            .strides(vec![4, 1])
            .max_shape(vec![3, 4])
            .max_shape_strides(vec![4, 1])
            .build()
            .unwrap();
        assert_eq!(meta.n_elems(), 12);
        assert_eq!(meta.physical_range(), Some((10, 21)));
        assert!(meta.descriptor().is_none());
    }

    #[test]
    fn test_malformed_lengths() {
        let err = ViewMetadata::builder([2, 3]).strides(vec![1]).build();
        assert!(matches!(err, Err(TensorustError::MalformedMetadata(_))));

        let err = ViewMetadata::builder([2, 3]).offsets(vec![0, 0, 0]).build();
        assert!(err.is_err());

        let err = ViewMetadata::builder([2, 3]).max_shape(vec![2]).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_malformed_max_shape_strides() {
        // Element count 12 == 3 * 4, but the strides drop part of the index.
        let err = ViewMetadata::builder([3, 4])
            .max_shape_strides(vec![4, 2])
            .build();
        assert!(matches!(err, Err(TensorustError::MalformedMetadata(_))));

        let err = ViewMetadata::builder([3, 4])
            .max_shape_strides(vec![1, 4])
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn test_malformed_extent() {
        let err = ViewMetadata::builder([3]).max_shape(vec![4]).build();
        assert!(err.is_err());

        let err = ViewMetadata::builder([3, 5]).broadcast_to(vec![3, 4]).build();
        assert!(err.is_err());

        let err = ViewMetadata::builder([1])
            .max_shape(vec![4])
            .broadcast_to(vec![4])
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_elements() {
        let meta = ViewMetadata::contiguous(&[3, 0]).unwrap();
        assert_eq!(meta.n_elems(), 0);
        assert_eq!(meta.physical_range(), None);
    }

    #[test]
    fn test_descriptor_round_trip() {
        let meta = ViewMetadata::builder([2, 3])
            .strides(vec![1, 2])
            .base_offset(4)
            .build()
            .unwrap();
        let desc = meta.descriptor().unwrap();
        let rebuilt = ViewMetadata::try_from(desc.clone()).unwrap();
        assert_eq!(rebuilt.strides(), meta.strides());
        assert_eq!(rebuilt.base_offset(), meta.base_offset());
        assert_eq!(rebuilt.descriptor(), Some(desc));
    }
}
