//! ## Exact representation
//! Stores every distinct address key in a hash set.
//!
//! Memory is proportional to the cardinality, which makes it the right choice while the
//! number of distinct addresses stays well below the size of the address space. The same
//! type is used as the private per-worker tally that is later merged into the shared
//! counter.

use std::collections::HashSet;
use std::hash::BuildHasherDefault;
use std::mem::size_of;

use wyhash::WyHash;

use crate::representation::RepresentationTrait;

type BuildWyHash = BuildHasherDefault<WyHash>;

/// Exact set of address keys
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExactSet {
    keys: HashSet<u32, BuildWyHash>,
}

impl ExactSet {
    /// Creates new empty `ExactSet`
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates new empty `ExactSet` able to hold `capacity` keys without rehashing
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: HashSet::with_capacity_and_hasher(capacity, BuildWyHash::default()),
        }
    }

    /// Return number of distinct keys stored
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert `key`, returning whether it was not present before
    #[inline]
    pub fn insert(&mut self, key: u32) -> bool {
        self.keys.insert(key)
    }

    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        self.keys.contains(&key)
    }

    /// Return approximate memory size of `ExactSet`: one key plus one control byte per bucket
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + self.keys.capacity() * (size_of::<u32>() + 1)
    }

    /// Iterate over stored keys in unspecified order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.keys.iter().copied()
    }
}

impl RepresentationTrait for ExactSet {
    #[inline]
    fn insert(&mut self, key: u32) -> bool {
        ExactSet::insert(self, key)
    }

    #[inline]
    fn contains(&self, key: u32) -> bool {
        ExactSet::contains(self, key)
    }

    #[inline]
    fn count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    fn size_of(&self) -> usize {
        ExactSet::size_of(self)
    }
}

impl Extend<u32> for ExactSet {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}

impl FromIterator<u32> for ExactSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl std::fmt::Debug for ExactSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExactSet {{ count: {} }}", self.len())
    }
}
