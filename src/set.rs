//! Sets of 64-bit integers behind a primitive-typed interface.

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use crate::datatype::{Datatype, Element};

/// A set of `i64` values.
///
/// Implementors provide the primitive `l*` operations; the collection-style
/// methods delegate to them. Iteration order is unspecified.
pub trait LongSet {
    fn lcontains(&self, value: i64) -> bool;

    /// Inserts `value`, returning `false` if it was already present.
    fn ladd(&mut self, value: i64) -> bool;

    /// Removes `value`, returning `true` if it was present.
    fn lremove(&mut self, value: i64) -> bool;

    fn lsize(&self) -> u64;

    fn contains(&self, value: i64) -> bool {
        self.lcontains(value)
    }

    fn add(&mut self, value: i64) -> bool {
        self.ladd(value)
    }

    fn remove(&mut self, value: i64) -> bool {
        self.lremove(value)
    }

    fn size(&self) -> usize {
        usize::try_from(self.lsize()).unwrap_or(usize::MAX)
    }

    fn datatype(&self) -> Datatype {
        <i64 as Element>::DATATYPE
    }
}

impl<S: BuildHasher> LongSet for HashSet<i64, S> {
    fn lcontains(&self, value: i64) -> bool {
        HashSet::contains(self, &value)
    }

    fn ladd(&mut self, value: i64) -> bool {
        self.insert(value)
    }

    fn lremove(&mut self, value: i64) -> bool {
        HashSet::remove(self, &value)
    }

    fn lsize(&self) -> u64 {
        self.len() as u64
    }
}

impl LongSet for BTreeSet<i64> {
    fn lcontains(&self, value: i64) -> bool {
        BTreeSet::contains(self, &value)
    }

    fn ladd(&mut self, value: i64) -> bool {
        self.insert(value)
    }

    fn lremove(&mut self, value: i64) -> bool {
        BTreeSet::remove(self, &value)
    }

    fn lsize(&self) -> u64 {
        self.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise<S: LongSet>(set: &mut S) {
        assert!(set.add(3));
        assert!(set.add(-7));
        assert!(!set.add(3));
        assert_eq!(set.size(), 2);
        assert!(LongSet::contains(set, -7));
        assert!(!LongSet::contains(set, 4));
        assert!(LongSet::remove(set, 3));
        assert!(!LongSet::remove(set, 3));
        assert_eq!(set.lsize(), 1);
        assert_eq!(LongSet::datatype(set), Datatype::Int64);
    }

    #[test]
    fn test_hash_set() {
        exercise(&mut HashSet::new());
    }

    #[test]
    fn test_btree_set() {
        exercise(&mut BTreeSet::new());
    }

    #[test]
    fn test_extremes() {
        let mut set: BTreeSet<i64> = BTreeSet::new();
        assert!(set.ladd(i64::MIN));
        assert!(set.ladd(i64::MAX));
        assert!(set.lcontains(i64::MIN));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![i64::MIN, i64::MAX]);
    }
}
