//! Adaptive counter records distinct IPv4 address keys in one of two exact representations:
//!
//! ## Exact representation
//! A hash set of keys. Memory grows with the number of distinct addresses, which keeps the
//! common case (files with fewer than `threshold` distinct addresses) small and fast.
//!
//! ## Bitmap representation
//! One bit per possible address (2^32 bits, 512 MiB). Memory is constant and insertion is a
//! single word update, so the counter stays bounded even when the cardinality approaches
//! the size of the whole address space.
//!
//! # Promotion
//! The counter starts as `Exact` and is promoted to `Bitmap` at most once. Promotion is
//! checked lazily when a batch of keys is merged, not on every insertion. The check uses
//! `exact_len + batch_len > threshold`, treating every incoming key as new; this is an
//! upper bound of the post-merge size, so promotion may happen slightly early but never
//! late. Promotion replaces the whole representation, carrying every existing key over.

use std::fmt::{Debug, Formatter};

use crate::bitmap::Bitmap;
use crate::exact::ExactSet;
use crate::representation::{Representation, RepresentationKind, RepresentationTrait};

/// Default promotion threshold (~16.7 million distinct addresses)
pub const DEFAULT_PROMOTION_THRESHOLD: usize = 1 << 24;

/// Distinct address counter switching from an exact set to a bitmap as it grows.
pub struct AdaptiveCounter {
    /// Active representation
    pub(crate) repr: Representation,
    /// Projected cardinality above which a merge promotes to `Bitmap`
    threshold: usize,
    /// Number of promotions performed (0 or 1)
    promotions: usize,
}

impl AdaptiveCounter {
    /// Creates new empty `AdaptiveCounter` with given promotion threshold
    #[inline]
    pub fn new(threshold: usize) -> Self {
        Self {
            repr: Representation::Exact(ExactSet::new()),
            threshold,
            promotions: 0,
        }
    }

    /// Insert address key into the active representation.
    /// Returns whether the key was not recorded before.
    #[inline]
    pub fn insert(&mut self, key: u32) -> bool {
        self.repr.insert(key)
    }

    /// Return whether address key was recorded
    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        self.repr.contains(key)
    }

    /// Return number of distinct address keys recorded
    #[inline]
    pub fn count(&self) -> usize {
        self.repr.count()
    }

    /// Return the active representation
    #[inline]
    pub fn representation(&self) -> RepresentationKind {
        self.repr.kind()
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Return number of promotions performed during the lifetime of this counter
    #[inline]
    pub fn promotions(&self) -> usize {
        self.promotions
    }

    /// Return approximate memory size of `AdaptiveCounter` in bytes
    #[inline]
    pub fn size_of(&self) -> usize {
        std::mem::size_of::<Self>() - std::mem::size_of::<Representation>() + self.repr.size_of()
    }

    /// Promote to `Bitmap` if merging `incoming` more keys could exceed the threshold.
    /// Returns whether promotion happened.
    pub fn promote_if_needed(&mut self, incoming: usize) -> bool {
        let Representation::Exact(set) = &self.repr else {
            return false;
        };
        if set.len().saturating_add(incoming) <= self.threshold {
            return false;
        }

        tracing::info!(
            exact = set.len(),
            incoming,
            threshold = self.threshold,
            "promoting distinct address counter to bitmap"
        );
        self.promote();
        true
    }

    /// Unconditionally promote to `Bitmap` representation, keeping every recorded key.
    /// Does nothing if the counter is already a `Bitmap`.
    pub fn promote(&mut self) {
        if let Representation::Exact(set) = &self.repr {
            let bitmap = Bitmap::from_keys(set.iter());
            // the exact set is dropped only after the bitmap fully replaced it
            self.repr = Representation::Bitmap(bitmap);
            self.promotions += 1;
        }
    }

    /// Merge a batch of distinct keys, promoting first if required
    pub fn merge(&mut self, batch: &ExactSet) {
        self.promote_if_needed(batch.len());
        match &mut self.repr {
            Representation::Exact(set) => set.extend(batch.iter()),
            Representation::Bitmap(bitmap) => batch.iter().for_each(|key| {
                bitmap.insert(key);
            }),
        }
    }

    /// Iterate over recorded keys in unspecified order
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.repr.keys()
    }

    /// Rebuild counter from its parts
    #[cfg(feature = "with_serde")]
    pub(crate) fn from_parts(repr: Representation, threshold: usize) -> Self {
        let promotions = usize::from(repr.kind() == RepresentationKind::Bitmap);
        Self {
            repr,
            threshold,
            promotions,
        }
    }
}

impl Default for AdaptiveCounter {
    fn default() -> Self {
        Self::new(DEFAULT_PROMOTION_THRESHOLD)
    }
}

impl Debug for AdaptiveCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ representation: {:?}, count: {}, size: {} }}",
            self.representation(),
            self.count(),
            self.size_of()
        )
    }
}

impl PartialEq for AdaptiveCounter {
    /// Compare recorded keys and threshold
    fn eq(&self, rhs: &Self) -> bool {
        self.threshold == rhs.threshold && self.repr == rhs.repr
    }
}
