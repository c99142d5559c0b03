//! LMDB implementation of PatternStore.
//!
//! Pattern records live under composite keys `brand_id ++ pattern_id`, so a
//! brand's patterns are a prefix range in insertion order. A side index maps
//! `pattern_id` back to its brand for lookups and deletes by id.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};
use serde::de::DeserializeOwned;

use acp_store::{PatternStore, StoreError};
use acp_types::{
    BrandId, CodePattern, CodePatternDraft, FakePattern, FakePatternDraft, PatternId,
};

use crate::environment::{decode, encode, range_scan_values, scan_values};
use crate::keys::{pattern_key, prefix_upper_bound, read_id};
use crate::meta::NEXT_PATTERN_ID;
use crate::{LmdbError, LmdbStore};

/// One of the two pattern tables with its id index.
#[derive(Clone, Copy)]
struct PatternTable<'a> {
    kind: &'static str,
    records: &'a Database<Bytes, Bytes>,
    index: &'a Database<Bytes, Bytes>,
}

impl PatternTable<'_> {
    fn brand_of(&self, txn: &RoTxn, id: PatternId) -> Result<BrandId, LmdbError> {
        self.index
            .get(txn, &id.to_be_bytes())?
            .and_then(read_id)
            .map(BrandId::new)
            .ok_or_else(|| LmdbError::NotFound(format!("{} pattern {id}", self.kind)))
    }

    fn get<T: DeserializeOwned>(&self, txn: &RoTxn, id: PatternId) -> Result<T, LmdbError> {
        let brand = self.brand_of(txn, id)?;
        let bytes = self
            .records
            .get(txn, &pattern_key(brand, id))?
            .ok_or_else(|| {
                LmdbError::Schema(format!("{} pattern {id} indexed but missing", self.kind))
            })?;
        decode(bytes)
    }

    fn put(
        &self,
        wtxn: &mut RwTxn,
        brand: BrandId,
        id: PatternId,
        value: &[u8],
    ) -> Result<(), LmdbError> {
        self.records.put(wtxn, &pattern_key(brand, id), value)?;
        self.index.put(wtxn, &id.to_be_bytes(), &brand.to_be_bytes())?;
        Ok(())
    }

    fn delete(&self, wtxn: &mut RwTxn, id: PatternId) -> Result<(), LmdbError> {
        let brand = self.brand_of(wtxn, id)?;
        self.records.delete(wtxn, &pattern_key(brand, id))?;
        self.index.delete(wtxn, &id.to_be_bytes())?;
        Ok(())
    }

    /// Remove every pattern of `brand`; returns how many went.
    fn delete_brand(&self, wtxn: &mut RwTxn, brand: BrandId) -> Result<usize, LmdbError> {
        let prefix = brand.to_be_bytes();
        let upper = prefix_upper_bound(&prefix);
        let bounds = (
            Bound::Included(prefix.as_slice()),
            match upper.as_deref() {
                Some(upper) => Bound::Excluded(upper),
                None => Bound::Unbounded,
            },
        );

        let mut keys = Vec::new();
        for entry in self.records.range(wtxn, &bounds)? {
            let (key, _) = entry?;
            keys.push(key.to_vec());
        }

        for key in &keys {
            self.records.delete(wtxn, key)?;
            if let Some(id) = key.get(8..) {
                self.index.delete(wtxn, id)?;
            }
        }
        Ok(keys.len())
    }
}

impl LmdbStore {
    fn code_table(&self) -> PatternTable<'_> {
        PatternTable {
            kind: "code",
            records: &self.code_patterns_db,
            index: &self.code_pattern_index_db,
        }
    }

    fn fake_table(&self) -> PatternTable<'_> {
        PatternTable {
            kind: "fake",
            records: &self.fake_patterns_db,
            index: &self.fake_pattern_index_db,
        }
    }

    fn require_brand(&self, txn: &RoTxn, brand: BrandId) -> Result<(), LmdbError> {
        match self.brands_db.get(txn, &brand.to_be_bytes())? {
            Some(_) => Ok(()),
            None => Err(LmdbError::NotFound(format!("brand {brand}"))),
        }
    }

    /// Cascade half of a brand delete; runs inside the caller's transaction.
    pub(crate) fn delete_patterns_of(
        &self,
        wtxn: &mut RwTxn,
        brand: BrandId,
    ) -> Result<usize, LmdbError> {
        let code = self.code_table().delete_brand(wtxn, brand)?;
        let fake = self.fake_table().delete_brand(wtxn, brand)?;
        Ok(code + fake)
    }
}

impl PatternStore for LmdbStore {
    fn insert_code_pattern(&self, draft: CodePatternDraft) -> Result<CodePattern, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.require_brand(&wtxn, draft.brand_id)?;
        let id = PatternId::new(self.allocate_id(&mut wtxn, NEXT_PATTERN_ID)?);
        let pattern = draft.into_pattern(id);
        self.code_table()
            .put(&mut wtxn, pattern.brand_id, id, &encode(&pattern)?)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(pattern)
    }

    fn get_code_pattern(&self, id: PatternId) -> Result<CodePattern, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.code_table().get(&rtxn, id)?)
    }

    fn delete_code_pattern(&self, id: PatternId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.code_table().delete(&mut wtxn, id)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn code_patterns_for_brand(&self, brand: BrandId) -> Result<Vec<CodePattern>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(range_scan_values(
            &self.code_patterns_db,
            &rtxn,
            &brand.to_be_bytes(),
        )?)
    }

    fn iter_code_patterns(&self) -> Result<Vec<CodePattern>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut patterns: Vec<CodePattern> = scan_values(&self.code_patterns_db, &rtxn)?;
        patterns.sort_by_key(|p| p.id);
        Ok(patterns)
    }

    fn insert_fake_pattern(&self, draft: FakePatternDraft) -> Result<FakePattern, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.require_brand(&wtxn, draft.brand_id)?;
        let id = PatternId::new(self.allocate_id(&mut wtxn, NEXT_PATTERN_ID)?);
        let pattern = draft.into_pattern(id);
        self.fake_table()
            .put(&mut wtxn, pattern.brand_id, id, &encode(&pattern)?)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(pattern)
    }

    fn get_fake_pattern(&self, id: PatternId) -> Result<FakePattern, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.fake_table().get(&rtxn, id)?)
    }

    fn delete_fake_pattern(&self, id: PatternId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.fake_table().delete(&mut wtxn, id)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn fake_patterns_for_brand(&self, brand: BrandId) -> Result<Vec<FakePattern>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(range_scan_values(
            &self.fake_patterns_db,
            &rtxn,
            &brand.to_be_bytes(),
        )?)
    }

    fn iter_fake_patterns(&self) -> Result<Vec<FakePattern>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut patterns: Vec<FakePattern> = scan_values(&self.fake_patterns_db, &rtxn)?;
        patterns.sort_by_key(|p| p.id);
        Ok(patterns)
    }
}
