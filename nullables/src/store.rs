//! Nullable store — thread-safe in-memory storage for testing.

use acp_store::{BrandStore, LogStats, PatternStore, StoreError, VerificationLogStore};
use acp_types::{
    AttemptId, Brand, BrandDraft, BrandId, CodePattern, CodePatternDraft, FakePattern,
    FakePatternDraft, PatternId, Timestamp, VerificationAttempt,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    next_brand_id: u64,
    next_pattern_id: u64,
    next_attempt_id: u64,
    brands: BTreeMap<BrandId, Brand>,
    code_patterns: BTreeMap<PatternId, CodePattern>,
    fake_patterns: BTreeMap<PatternId, FakePattern>,
    attempts: BTreeMap<AttemptId, VerificationAttempt>,
}

impl Tables {
    fn next_brand(&mut self) -> BrandId {
        self.next_brand_id += 1;
        BrandId::new(self.next_brand_id)
    }

    fn next_pattern(&mut self) -> PatternId {
        self.next_pattern_id += 1;
        PatternId::new(self.next_pattern_id)
    }

    fn name_taken(&self, name: &str, except: Option<BrandId>) -> bool {
        self.brands
            .values()
            .any(|b| b.name == name && Some(b.id) != except)
    }
}

/// An in-memory brand + pattern + log store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// `fail_reads` makes every read return a backend error (simulates an
/// unreachable store); `fail_log_writes` makes only `append_attempt` fail.
pub struct NullStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
    fail_log_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            fail_reads: AtomicBool::new(false),
            fail_log_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_log_writes(&self, fail: bool) {
        self.fail_log_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of log entries written so far.
    pub fn attempt_count(&self) -> usize {
        self.tables.lock().unwrap().attempts.len()
    }

    /// The most recently appended log entry.
    pub fn last_attempt(&self) -> Option<VerificationAttempt> {
        self.tables
            .lock()
            .unwrap()
            .attempts
            .values()
            .next_back()
            .cloned()
    }

    /// Convenience for tests: create a brand with the given genuine and fake
    /// patterns in one call.
    pub fn seed_brand(&self, name: &str, genuine: &[&str], fake: &[&str]) -> Brand {
        let brand = self
            .insert_brand(
                BrandDraft {
                    name: name.to_string(),
                    description: format!("{name} test brand"),
                    ..Default::default()
                },
                Timestamp::new(0),
            )
            .unwrap();
        for pattern in genuine {
            self.insert_code_pattern(CodePatternDraft {
                brand_id: brand.id,
                pattern: pattern.to_string(),
                is_genuine: true,
                notes: None,
            })
            .unwrap();
        }
        for pattern in fake {
            self.insert_fake_pattern(FakePatternDraft {
                brand_id: brand.id,
                pattern: pattern.to_string(),
                fake_signs: Vec::new(),
                risk_level: Default::default(),
            })
            .unwrap();
        }
        brand
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("null store: reads disabled".into()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BrandStore for NullStore {
    fn insert_brand(&self, draft: BrandDraft, now: Timestamp) -> Result<Brand, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.name_taken(draft.name.trim(), None) {
            return Err(StoreError::Duplicate(draft.name));
        }
        let id = tables.next_brand();
        let brand = draft.into_brand(id, now);
        tables.brands.insert(id, brand.clone());
        Ok(brand)
    }

    fn get_brand(&self, id: BrandId) -> Result<Brand, StoreError> {
        self.check_reads()?;
        self.tables
            .lock()
            .unwrap()
            .brands
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("brand {id}")))
    }

    fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .brands
            .values()
            .find(|b| b.name == name)
            .cloned())
    }

    fn update_brand(&self, id: BrandId, draft: BrandDraft) -> Result<Brand, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let created_at = tables
            .brands
            .get(&id)
            .map(|b| b.created_at)
            .ok_or_else(|| StoreError::NotFound(format!("brand {id}")))?;
        if tables.name_taken(draft.name.trim(), Some(id)) {
            return Err(StoreError::Duplicate(draft.name));
        }
        let brand = draft.into_brand(id, created_at);
        tables.brands.insert(id, brand.clone());
        Ok(brand)
    }

    fn delete_brand(&self, id: BrandId) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.brands.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("brand {id}")));
        }
        let before = tables.code_patterns.len() + tables.fake_patterns.len();
        tables.code_patterns.retain(|_, p| p.brand_id != id);
        tables.fake_patterns.retain(|_, p| p.brand_id != id);
        Ok(before - tables.code_patterns.len() - tables.fake_patterns.len())
    }

    fn iter_brands(&self) -> Result<Vec<Brand>, StoreError> {
        self.check_reads()?;
        Ok(self.tables.lock().unwrap().brands.values().cloned().collect())
    }
}

impl PatternStore for NullStore {
    fn insert_code_pattern(&self, draft: CodePatternDraft) -> Result<CodePattern, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.brands.contains_key(&draft.brand_id) {
            return Err(StoreError::NotFound(format!("brand {}", draft.brand_id)));
        }
        let id = tables.next_pattern();
        let pattern = draft.into_pattern(id);
        tables.code_patterns.insert(id, pattern.clone());
        Ok(pattern)
    }

    fn get_code_pattern(&self, id: PatternId) -> Result<CodePattern, StoreError> {
        self.check_reads()?;
        self.tables
            .lock()
            .unwrap()
            .code_patterns
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("code pattern {id}")))
    }

    fn delete_code_pattern(&self, id: PatternId) -> Result<(), StoreError> {
        self.tables
            .lock()
            .unwrap()
            .code_patterns
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("code pattern {id}")))
    }

    fn code_patterns_for_brand(&self, brand: BrandId) -> Result<Vec<CodePattern>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .code_patterns
            .values()
            .filter(|p| p.brand_id == brand)
            .cloned()
            .collect())
    }

    fn iter_code_patterns(&self) -> Result<Vec<CodePattern>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .code_patterns
            .values()
            .cloned()
            .collect())
    }

    fn insert_fake_pattern(&self, draft: FakePatternDraft) -> Result<FakePattern, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.brands.contains_key(&draft.brand_id) {
            return Err(StoreError::NotFound(format!("brand {}", draft.brand_id)));
        }
        let id = tables.next_pattern();
        let pattern = draft.into_pattern(id);
        tables.fake_patterns.insert(id, pattern.clone());
        Ok(pattern)
    }

    fn get_fake_pattern(&self, id: PatternId) -> Result<FakePattern, StoreError> {
        self.check_reads()?;
        self.tables
            .lock()
            .unwrap()
            .fake_patterns
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("fake pattern {id}")))
    }

    fn delete_fake_pattern(&self, id: PatternId) -> Result<(), StoreError> {
        self.tables
            .lock()
            .unwrap()
            .fake_patterns
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("fake pattern {id}")))
    }

    fn fake_patterns_for_brand(&self, brand: BrandId) -> Result<Vec<FakePattern>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .fake_patterns
            .values()
            .filter(|p| p.brand_id == brand)
            .cloned()
            .collect())
    }

    fn iter_fake_patterns(&self) -> Result<Vec<FakePattern>, StoreError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .fake_patterns
            .values()
            .cloned()
            .collect())
    }
}

impl VerificationLogStore for NullStore {
    fn append_attempt(&self, attempt: &VerificationAttempt) -> Result<AttemptId, StoreError> {
        if self.fail_log_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("null store: log writes disabled".into()));
        }
        let mut tables = self.tables.lock().unwrap();
        tables.next_attempt_id += 1;
        let id = AttemptId::new(tables.next_attempt_id);
        tables.attempts.insert(id, attempt.clone());
        Ok(id)
    }

    fn get_attempt(&self, id: AttemptId) -> Result<VerificationAttempt, StoreError> {
        self.check_reads()?;
        self.tables
            .lock()
            .unwrap()
            .attempts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("attempt {id}")))
    }

    fn iter_attempts_desc(
        &self,
        before: Option<AttemptId>,
        limit: usize,
    ) -> Result<Vec<(AttemptId, VerificationAttempt)>, StoreError> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        let upper = before.unwrap_or(AttemptId::new(u64::MAX));
        Ok(tables
            .attempts
            .range(..upper)
            .rev()
            .take(limit)
            .map(|(id, a)| (*id, a.clone()))
            .collect())
    }

    fn attempt_stats(&self) -> Result<LogStats, StoreError> {
        self.check_reads()?;
        let mut stats = LogStats::default();
        for attempt in self.tables.lock().unwrap().attempts.values() {
            stats.record(attempt.result);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acp_store::PatternRepository;

    #[test]
    fn test_duplicate_brand_name_rejected() {
        let store = NullStore::new();
        store.seed_brand("Hennessy", &[], &[]);
        let err = store
            .insert_brand(
                BrandDraft {
                    name: "Hennessy".into(),
                    description: "again".into(),
                    ..Default::default()
                },
                Timestamp::new(1),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn test_lookup_unknown_brand_is_empty() {
        let store = NullStore::new();
        let patterns = store.lookup("Nonexistent").unwrap();
        assert!(!patterns.is_resolved());
        assert!(patterns.genuine.is_empty());
        assert!(patterns.fake.is_empty());
    }

    #[test]
    fn test_lookup_skips_non_genuine_code_patterns() {
        let store = NullStore::new();
        let brand = store.seed_brand("Dior", &["^DR[0-9]+$"], &["^FAKE"]);
        store
            .insert_code_pattern(CodePatternDraft {
                brand_id: brand.id,
                pattern: "^XX".into(),
                is_genuine: false,
                notes: None,
            })
            .unwrap();
        let patterns = store.lookup("Dior").unwrap();
        assert_eq!(patterns.genuine.len(), 1);
        assert_eq!(patterns.genuine[0].pattern, "^DR[0-9]+$");
        assert_eq!(patterns.fake.len(), 1);
    }

    #[test]
    fn test_delete_brand_cascades() {
        let store = NullStore::new();
        let brand = store.seed_brand("Martell", &["^MT"], &["^00000", "^TEST"]);
        let removed = store.delete_brand(brand.id).unwrap();
        assert_eq!(removed, 3);
        assert!(store.iter_code_patterns().unwrap().is_empty());
        assert!(store.iter_fake_patterns().unwrap().is_empty());
    }

    #[test]
    fn test_pattern_for_unknown_brand_rejected() {
        let store = NullStore::new();
        let err = store
            .insert_fake_pattern(FakePatternDraft {
                brand_id: BrandId::new(404),
                pattern: "^00000".into(),
                fake_signs: vec![],
                risk_level: Default::default(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_fail_reads_breaks_lookup() {
        let store = NullStore::new();
        store.seed_brand("Jameson", &["^JM"], &[]);
        store.set_fail_reads(true);
        assert!(store.lookup("Jameson").is_err());
    }
}
