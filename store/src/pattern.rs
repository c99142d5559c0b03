//! Genuine/fake pattern storage trait.

use crate::StoreError;
use acp_types::{BrandId, CodePattern, CodePatternDraft, FakePattern, FakePatternDraft, PatternId};

/// Trait for code pattern storage.
///
/// Patterns belong to exactly one brand. Per-brand listings come back in
/// insertion order, which is the order the engines test them in.
pub trait PatternStore {
    /// Insert a genuine-pattern record. Fails with `NotFound` for an unknown brand.
    fn insert_code_pattern(&self, draft: CodePatternDraft) -> Result<CodePattern, StoreError>;

    fn get_code_pattern(&self, id: PatternId) -> Result<CodePattern, StoreError>;

    fn delete_code_pattern(&self, id: PatternId) -> Result<(), StoreError>;

    fn code_patterns_for_brand(&self, brand: BrandId) -> Result<Vec<CodePattern>, StoreError>;

    fn iter_code_patterns(&self) -> Result<Vec<CodePattern>, StoreError>;

    /// Insert a counterfeit-pattern record. Fails with `NotFound` for an unknown brand.
    fn insert_fake_pattern(&self, draft: FakePatternDraft) -> Result<FakePattern, StoreError>;

    fn get_fake_pattern(&self, id: PatternId) -> Result<FakePattern, StoreError>;

    fn delete_fake_pattern(&self, id: PatternId) -> Result<(), StoreError>;

    fn fake_patterns_for_brand(&self, brand: BrandId) -> Result<Vec<FakePattern>, StoreError>;

    fn iter_fake_patterns(&self) -> Result<Vec<FakePattern>, StoreError>;
}
