use enum_dispatch::enum_dispatch;

use crate::bitmap::Bitmap;
use crate::exact::ExactSet;

/// Representation types supported by `AdaptiveCounter`
#[derive(Debug, PartialEq)]
#[enum_dispatch]
pub(crate) enum Representation {
    Exact(ExactSet),
    Bitmap(Bitmap),
}

/// Representation trait which must be implemented by all representations.
#[enum_dispatch(Representation)]
pub(crate) trait RepresentationTrait {
    /// Insert `key`, returning whether it was not present before
    fn insert(&mut self, key: u32) -> bool;
    fn contains(&self, key: u32) -> bool;
    /// Number of distinct keys recorded
    fn count(&self) -> usize;
    /// Approximate memory footprint in bytes
    fn size_of(&self) -> usize;
}

/// Public, data-less tag of the active representation
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    Exact = 0,
    Bitmap = 1,
}

/// Representation error
#[cfg(any(test, feature = "with_serde"))]
#[derive(Debug, PartialEq, Eq)]
pub enum RepresentationError {
    InvalidRepresentation,
    DuplicateKeys,
}

impl Representation {
    /// Returns the tag of this representation
    #[inline]
    pub(crate) fn kind(&self) -> RepresentationKind {
        match self {
            Representation::Exact(_) => RepresentationKind::Exact,
            Representation::Bitmap(_) => RepresentationKind::Bitmap,
        }
    }

    /// Iterate over every key stored in this representation
    pub(crate) fn keys(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Representation::Exact(set) => Box::new(set.iter()),
            Representation::Bitmap(bitmap) => Box::new(bitmap.iter()),
        }
    }

    /// Rebuild a representation of the given tag from its keys.
    ///
    /// Fails for unknown tags and when `keys` holds duplicates, since those could not have
    /// been produced by `keys()`.
    #[cfg(any(test, feature = "with_serde"))]
    pub(crate) fn try_from_keys(tag: u8, keys: Vec<u32>) -> Result<Self, RepresentationError> {
        let expected = keys.len();
        let repr = match tag {
            0 => {
                let mut set = ExactSet::with_capacity(expected);
                set.extend(keys);
                Representation::Exact(set)
            }
            1 => Representation::Bitmap(Bitmap::from_keys(keys)),
            _ => return Err(RepresentationError::InvalidRepresentation),
        };

        if repr.count() != expected {
            return Err(RepresentationError::DuplicateKeys);
        }
        Ok(repr)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0 => RepresentationKind::Exact; "exact tag")]
    #[test_case(1 => RepresentationKind::Bitmap; "bitmap tag")]
    fn test_try_from_keys(tag: u8) -> RepresentationKind {
        let repr = Representation::try_from_keys(tag, vec![3, 1, 2]).unwrap();
        assert_eq!(repr.count(), 3);
        let mut keys: Vec<u32> = repr.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
        repr.kind()
    }

    #[test]
    fn test_try_from_keys_rejects_invalid_input() {
        assert_eq!(
            Representation::try_from_keys(2, vec![]).unwrap_err(),
            RepresentationError::InvalidRepresentation
        );
        assert_eq!(
            Representation::try_from_keys(0, vec![1, 1]).unwrap_err(),
            RepresentationError::DuplicateKeys
        );
    }

    #[test]
    fn test_dispatch() {
        let mut repr = Representation::from(ExactSet::new());
        assert!(repr.insert(5));
        assert!(!repr.insert(5));
        assert!(repr.contains(5));
        assert_eq!(repr.count(), 1);
    }
}
