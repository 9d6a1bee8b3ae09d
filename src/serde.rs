//! # Serde module for AdaptiveCounter
//!
//! `AdaptiveCounter` is serialized as a tuple of three elements:
//! `(representation, threshold, keys)`, where `representation` is `0` for the exact set and
//! `1` for the bitmap, and `keys` is the ascending list of recorded address keys.
//!
//! Storing keys instead of raw bitmap words keeps snapshots of small counters small, at the
//! price of 4 bytes per key for promoted ones. During deserialization the representation is
//! rebuilt from the keys; unknown representation tags and duplicate keys are rejected.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::counter::AdaptiveCounter;
use crate::representation::Representation;

impl Serialize for AdaptiveCounter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut keys: Vec<u32> = self.keys().collect();
        // bitmap keys are already ascending
        if let Representation::Exact(_) = self.repr {
            keys.sort_unstable();
        }

        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&(self.representation() as u8))?;
        tup.serialize_element(&self.threshold())?;
        tup.serialize_element(&keys)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for AdaptiveCounter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (tag, threshold, keys): (u8, usize, Vec<u32>) =
            Deserialize::deserialize(deserializer)?;
        let repr =
            Representation::try_from_keys(tag, keys).map_err(|e| Error::custom(format!("{:?}", e)))?;
        Ok(AdaptiveCounter::from_parts(repr, threshold))
    }
}
