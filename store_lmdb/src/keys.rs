//! Key encoding.
//!
//! Ids are stored big-endian so byte order equals numeric order. Per-brand
//! pattern keys are `brand_id ++ pattern_id`, making a brand's patterns one
//! contiguous range in insertion order.

use acp_types::{BrandId, PatternId};

/// Build composite key `brand_id ++ pattern_id`.
pub fn pattern_key(brand: BrandId, pattern: PatternId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&brand.to_be_bytes());
    key[8..].copy_from_slice(&pattern.to_be_bytes());
    key
}

/// Read an 8-byte big-endian id from the start of `bytes`.
pub fn read_id(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}

/// Exclusive upper bound for a prefix range-scan: the prefix incremented as
/// a big-endian integer with trailing `0xff` bytes dropped.
///
/// `None` when every byte is `0xff`, meaning the scan runs to the end.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}
