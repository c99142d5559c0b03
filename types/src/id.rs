//! Store-assigned record identifiers.
//!
//! Ids are allocated by the storage backend from a monotonically increasing
//! counter, so ordering by id is insertion order. They are encoded big-endian
//! in storage keys to keep that order under byte-wise comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }

            /// Big-endian key bytes.
            pub fn to_be_bytes(&self) -> [u8; 8] {
                self.0.to_be_bytes()
            }

            pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
                Self(u64::from_be_bytes(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

record_id!(
    /// Identifies a [`Brand`](crate::Brand).
    BrandId
);
record_id!(
    /// Identifies a genuine or fake pattern record.
    PatternId
);
record_id!(
    /// Identifies an entry in the verification log.
    AttemptId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_keys_sort_like_ids() {
        let small = BrandId::new(2).to_be_bytes();
        let large = BrandId::new(256).to_be_bytes();
        assert!(small < large);
    }

    #[test]
    fn parses_from_path_segment() {
        assert_eq!("42".parse::<PatternId>().unwrap(), PatternId::new(42));
        assert!("abc".parse::<PatternId>().is_err());
    }
}
