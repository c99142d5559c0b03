//! Brand catalogue seeding from a TOML file.
//!
//! ```toml
//! [[brands]]
//! name = "Hennessy"
//! description = "French cognac brand"
//! tags = ["Cognac"]
//!
//! [[brands.genuine]]
//! pattern = "^HN[0-9]{6,8}$"
//! notes = "HN followed by 6-8 digits"
//!
//! [[brands.fake]]
//! pattern = "^00000"
//! fake_signs = ["All zeros"]
//! risk_level = "high"
//! ```

use serde::Deserialize;
use std::path::Path;

use acp_store::{BrandStore, PatternStore};
use acp_types::{BrandDraft, CodePatternDraft, FakePatternDraft, RiskLevel, Timestamp};

use crate::error::DaemonError;

#[derive(Debug, Deserialize)]
pub struct SeedCatalogue {
    #[serde(default)]
    pub brands: Vec<SeedBrand>,
}

#[derive(Debug, Deserialize)]
pub struct SeedBrand {
    #[serde(flatten)]
    pub brand: BrandDraft,
    #[serde(default)]
    pub genuine: Vec<SeedGenuine>,
    #[serde(default)]
    pub fake: Vec<SeedFake>,
}

#[derive(Debug, Deserialize)]
pub struct SeedGenuine {
    pub pattern: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedFake {
    pub pattern: String,
    #[serde(default)]
    pub fake_signs: Vec<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub brands_added: usize,
    pub brands_skipped: usize,
    pub patterns_added: usize,
}

impl SeedCatalogue {
    pub fn from_toml_file(path: &Path) -> Result<Self, DaemonError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        let catalogue: Self = toml::from_str(s).map_err(|e| DaemonError::Seed(e.to_string()))?;
        for entry in &catalogue.brands {
            entry
                .brand
                .validate()
                .map_err(|e| DaemonError::Seed(format!("brand {:?}: {e}", entry.brand.name)))?;
        }
        Ok(catalogue)
    }

    /// Insert every brand not already present, with its patterns.
    ///
    /// Existing brands are left untouched, so reseeding is harmless.
    pub fn apply<S>(self, store: &S, now: Timestamp) -> Result<SeedReport, DaemonError>
    where
        S: BrandStore + PatternStore + ?Sized,
    {
        let mut report = SeedReport::default();
        for entry in self.brands {
            if store.find_brand_by_name(entry.brand.name.trim())?.is_some() {
                tracing::info!(brand = %entry.brand.name, "brand exists, skipping");
                report.brands_skipped += 1;
                continue;
            }
            let brand = store.insert_brand(entry.brand, now)?;
            for genuine in entry.genuine {
                store.insert_code_pattern(CodePatternDraft {
                    brand_id: brand.id,
                    pattern: genuine.pattern,
                    is_genuine: true,
                    notes: genuine.notes,
                })?;
                report.patterns_added += 1;
            }
            for fake in entry.fake {
                store.insert_fake_pattern(FakePatternDraft {
                    brand_id: brand.id,
                    pattern: fake.pattern,
                    fake_signs: fake.fake_signs,
                    risk_level: fake.risk_level,
                })?;
                report.patterns_added += 1;
            }
            tracing::info!(brand = %brand.name, id = %brand.id, "seeded brand");
            report.brands_added += 1;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acp_nullables::NullStore;
    use acp_store::PatternRepository;

    const CATALOGUE: &str = r#"
        [[brands]]
        name = "Hennessy"
        description = "French cognac brand"
        tags = ["Cognac", "Premium"]

        [[brands.genuine]]
        pattern = "^HN[0-9]{6,8}$"
        notes = "Batch code"

        [[brands.genuine]]
        pattern = "^[0-9]{13}$"

        [[brands.fake]]
        pattern = "^00000"
        fake_signs = ["All zeros"]
        risk_level = "high"

        [[brands]]
        name = "Martell"
        description = "Cognac house founded in 1715"
    "#;

    #[test]
    fn seeds_brands_and_patterns() {
        let store = NullStore::new();
        let report = SeedCatalogue::from_toml_str(CATALOGUE)
            .unwrap()
            .apply(&store, Timestamp::new(5))
            .unwrap();
        assert_eq!(
            report,
            SeedReport {
                brands_added: 2,
                brands_skipped: 0,
                patterns_added: 3,
            }
        );
        let patterns = store.lookup("Hennessy").unwrap();
        assert_eq!(patterns.genuine.len(), 2);
        assert_eq!(patterns.fake[0].risk_level, RiskLevel::High);
        assert_eq!(patterns.brand.unwrap().tags, ["Cognac", "Premium"]);
    }

    #[test]
    fn reseeding_skips_existing_brands() {
        let store = NullStore::new();
        store.seed_brand("Hennessy", &[], &[]);
        let report = SeedCatalogue::from_toml_str(CATALOGUE)
            .unwrap()
            .apply(&store, Timestamp::new(5))
            .unwrap();
        assert_eq!(report.brands_added, 1);
        assert_eq!(report.brands_skipped, 1);
        assert!(store.lookup("Hennessy").unwrap().genuine.is_empty());
    }

    #[test]
    fn brand_without_description_rejected() {
        let err = SeedCatalogue::from_toml_str("[[brands]]\nname = \"Nameless\"\ndescription = \"\"\n")
            .unwrap_err();
        assert!(matches!(err, DaemonError::Seed(_)));
    }

    fn bundled_catalogues() -> Vec<(String, SeedCatalogue)> {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../seeds");
        let mut files: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        files.sort();
        files
            .into_iter()
            .map(|path| {
                let catalogue = SeedCatalogue::from_toml_file(&path)
                    .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
                (path.display().to_string(), catalogue)
            })
            .collect()
    }

    #[test]
    fn every_bundled_catalogue_parses() {
        let catalogues = bundled_catalogues();
        assert_eq!(catalogues.len(), 3);
        for (path, catalogue) in &catalogues {
            assert!(!catalogue.brands.is_empty(), "{path} has no brands");
            for entry in &catalogue.brands {
                assert!(
                    !entry.genuine.is_empty(),
                    "{path}: {} has no genuine patterns",
                    entry.brand.name
                );
            }
        }
    }

    #[test]
    fn bundled_catalogues_seed_together() {
        let store = NullStore::new();
        let mut added = 0;
        for (_, catalogue) in bundled_catalogues() {
            let report = catalogue.apply(&store, Timestamp::new(5)).unwrap();
            assert_eq!(report.brands_skipped, 0);
            added += report.brands_added;
        }
        assert_eq!(added, 7 + 46 + 43);

        let dior = store.lookup("Dior").unwrap();
        assert!(dior.is_resolved());
        assert_eq!(dior.genuine[0].pattern, "^CD[0-9]{6,8}$");
        assert_eq!(dior.fake.len(), 2);
        assert!(store.lookup("Creed").unwrap().is_resolved());
    }
}
