//! Shape handling for tensor views.
//!
//! A shape is an ordered list of dimension entries. An entry is either a
//! fixed extent or an indexed dimension whose positions are supplied by a
//! nested `Reader<i64>`, which is how ragged and delegated dimensions are
//! expressed.

use std::fmt;
use std::sync::Arc;

use crate::storage::{Access, Reader};

/// A shared reader of physical index contributions.
pub type IndexReader = Arc<dyn Reader<i64> + Send + Sync>;

/// One dimension of a [`Shape`].
#[derive(Clone)]
pub enum ShapeEntry {
    /// A dimension of fixed size addressed through its stride.
    Extent(u64),
    /// A dimension whose per-position offsets come from a nested reader.
    /// Its extent is the reader's size.
    Indexed(IndexReader),
}

impl ShapeEntry {
    /// Creates an indexed entry from any shareable index reader.
    pub fn indexed<R>(reader: R) -> Self
    where
        R: Reader<i64> + Send + Sync + 'static,
    {
        ShapeEntry::Indexed(Arc::new(reader))
    }

    /// Returns the number of positions along this dimension.
    pub fn extent(&self) -> u64 {
        match self {
            ShapeEntry::Extent(n) => *n,
            ShapeEntry::Indexed(reader) => reader.lsize(),
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, ShapeEntry::Indexed(_))
    }
}

impl fmt::Debug for ShapeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeEntry::Extent(n) => write!(f, "{n}"),
            ShapeEntry::Indexed(reader) => write!(f, "Indexed({})", reader.lsize()),
        }
    }
}

impl From<u64> for ShapeEntry {
    fn from(extent: u64) -> Self {
        ShapeEntry::Extent(extent)
    }
}

impl From<IndexReader> for ShapeEntry {
    fn from(reader: IndexReader) -> Self {
        ShapeEntry::Indexed(reader)
    }
}

/// The ordered dimension entries of a tensor view.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    entries: Vec<ShapeEntry>,
}

impl Shape {
    pub fn new(entries: Vec<ShapeEntry>) -> Self {
        Self { entries }
    }

    /// Creates a rank-0 shape holding a single element.
    pub fn scalar() -> Self {
        Self::default()
    }

    pub fn from_extents(extents: &[u64]) -> Self {
        Self {
            entries: extents.iter().copied().map(ShapeEntry::Extent).collect(),
        }
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ShapeEntry] {
        &self.entries
    }

    /// Returns the extent of every dimension.
    pub fn extents(&self) -> Vec<u64> {
        self.entries.iter().map(ShapeEntry::extent).collect()
    }

    /// Returns the total number of elements, 1 for a scalar, or `None` if
    /// the product overflows.
    pub fn n_elems(&self) -> Option<u64> {
        self.entries
            .iter()
            .try_fold(1u64, |acc, entry| acc.checked_mul(entry.extent()))
    }

    pub fn has_indexed(&self) -> bool {
        self.entries.iter().any(ShapeEntry::is_indexed)
    }

    /// Prepends size-1 dimensions until the rank reaches `rank`.
    pub(crate) fn pad_to_rank(&mut self, rank: usize) {
        if rank > self.entries.len() {
            let mut padded = vec![ShapeEntry::Extent(1); rank - self.entries.len()];
            padded.append(&mut self.entries);
            self.entries = padded;
        }
    }

    /// Checks whether this shape can be broadcast to `target`.
    ///
    /// Dimensions are aligned from the right; each extent must either equal
    /// the target extent, be 1, or evenly divide it.
    pub fn is_broadcast_compatible(&self, target: &[u64]) -> bool {
        if self.rank() > target.len() {
            return false;
        }
        let offset = target.len() - self.rank();
        self.entries.iter().enumerate().all(|(i, entry)| {
            let dim = entry.extent();
            let target_dim = target[offset + i];
            dim == target_dim || dim == 1 || (dim != 0 && target_dim % dim == 0)
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{entry:?}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<ShapeEntry>> for Shape {
    fn from(entries: Vec<ShapeEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<Vec<u64>> for Shape {
    fn from(extents: Vec<u64>) -> Self {
        Self::from_extents(&extents)
    }
}

impl From<&[u64]> for Shape {
    fn from(extents: &[u64]) -> Self {
        Self::from_extents(extents)
    }
}

impl<const N: usize> From<[u64; N]> for Shape {
    fn from(extents: [u64; N]) -> Self {
        Self::from_extents(&extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.n_elems(), Some(1));
        assert!(s.extents().is_empty());
    }

    #[test]
    fn test_indexed_entry() {
        let s = Shape::new(vec![
            ShapeEntry::Extent(3),
            ShapeEntry::indexed(vec![10i64, 11, 12, 13]),
        ]);
        assert_eq!(s.extents(), vec![3, 4]);
        assert_eq!(s.n_elems(), Some(12));
        assert!(s.has_indexed());
        assert_eq!(format!("{s}"), "[3, Indexed(4)]");
    }

    #[test]
    fn test_zero_extent() {
        let s = Shape::from([2, 0, 4]);
        assert_eq!(s.n_elems(), Some(0));
    }

    #[test]
    fn test_element_count_overflow() {
        assert_eq!(Shape::from([u64::MAX, 2]).n_elems(), None);
        assert_eq!(Shape::from([u64::MAX, 1]).n_elems(), Some(u64::MAX));
    }

    #[test]
    fn test_broadcasting() {
        let s = Shape::from([1, 3, 1]);
        assert!(s.is_broadcast_compatible(&[2, 3, 4]));

        let s = Shape::from([3, 1]);
        assert!(s.is_broadcast_compatible(&[2, 3, 4]));

        let s = Shape::from([2, 4]);
        assert!(s.is_broadcast_compatible(&[3, 4, 8]));

        let s = Shape::from([3, 5]);
        assert!(!s.is_broadcast_compatible(&[2, 3, 4]));
        assert!(!s.is_broadcast_compatible(&[5]));
    }

    #[test]
    fn test_pad_to_rank() {
        let mut s = Shape::from([3, 4]);
        s.pad_to_rank(4);
        assert_eq!(s.extents(), vec![1, 1, 3, 4]);
        s.pad_to_rank(2);
        assert_eq!(s.rank(), 4);
    }
}
