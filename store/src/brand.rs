//! Brand storage trait.

use crate::StoreError;
use acp_types::{Brand, BrandDraft, BrandId, Timestamp};

/// Trait for brand catalogue operations.
pub trait BrandStore {
    /// Insert a new brand. Fails with `Duplicate` if the name is taken.
    fn insert_brand(&self, draft: BrandDraft, now: Timestamp) -> Result<Brand, StoreError>;

    fn get_brand(&self, id: BrandId) -> Result<Brand, StoreError>;

    /// Exact, case-sensitive lookup by name.
    fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError>;

    /// Replace the editable fields of an existing brand, keeping its id and
    /// creation time. Renaming onto another brand's name fails with `Duplicate`.
    fn update_brand(&self, id: BrandId, draft: BrandDraft) -> Result<Brand, StoreError>;

    /// Delete a brand together with all of its genuine and fake patterns.
    ///
    /// Returns the number of pattern records removed alongside it.
    fn delete_brand(&self, id: BrandId) -> Result<usize, StoreError>;

    /// All brands in insertion order.
    fn iter_brands(&self) -> Result<Vec<Brand>, StoreError>;

    fn brand_count(&self) -> Result<u64, StoreError> {
        self.iter_brands().map(|v| v.len() as u64)
    }
}
