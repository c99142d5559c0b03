//! Read-only per-brand pattern lookup used by the verification engines.

use crate::{BrandStore, PatternStore, StoreError};
use acp_types::{Brand, CodePattern, FakePattern};

/// A snapshot of one brand's pattern sets, taken once per request.
#[derive(Clone, Debug, Default)]
pub struct BrandPatterns {
    /// `None` when the submitted name does not resolve to a stored brand.
    pub brand: Option<Brand>,
    /// Genuine patterns (`is_genuine = true` only), in stored order.
    pub genuine: Vec<CodePattern>,
    /// Counterfeit patterns, in stored order.
    pub fake: Vec<FakePattern>,
}

impl BrandPatterns {
    pub fn is_resolved(&self) -> bool {
        self.brand.is_some()
    }
}

/// Resolves a brand name to its genuine and fake pattern sets.
///
/// An unknown name is not an error: it yields an unresolved, empty snapshot.
/// Errors mean the backend itself could not be read.
pub trait PatternRepository {
    fn lookup(&self, brand_name: &str) -> Result<BrandPatterns, StoreError>;
}

impl<T> PatternRepository for T
where
    T: BrandStore + PatternStore + ?Sized,
{
    fn lookup(&self, brand_name: &str) -> Result<BrandPatterns, StoreError> {
        let Some(brand) = self.find_brand_by_name(brand_name)? else {
            return Ok(BrandPatterns::default());
        };
        let genuine = self
            .code_patterns_for_brand(brand.id)?
            .into_iter()
            .filter(|p| p.is_genuine)
            .collect();
        let fake = self.fake_patterns_for_brand(brand.id)?;
        Ok(BrandPatterns {
            brand: Some(brand),
            genuine,
            fake,
        })
    }
}
