//! LMDB implementation of BrandStore.

use acp_store::{BrandStore, StoreError};
use acp_types::{Brand, BrandDraft, BrandId, Timestamp};
use heed::RwTxn;

use crate::environment::{decode, encode, scan_values};
use crate::keys::read_id;
use crate::meta::NEXT_BRAND_ID;
use crate::{LmdbError, LmdbStore};

impl LmdbStore {
    fn brand_id_by_name(&self, txn: &heed::RoTxn, name: &str) -> Result<Option<BrandId>, LmdbError> {
        Ok(self
            .brand_names_db
            .get(txn, name.as_bytes())?
            .and_then(read_id)
            .map(BrandId::new))
    }

    fn load_brand(&self, txn: &heed::RoTxn, id: BrandId) -> Result<Brand, LmdbError> {
        let bytes = self
            .brands_db
            .get(txn, &id.to_be_bytes())?
            .ok_or_else(|| LmdbError::NotFound(format!("brand {id}")))?;
        decode(bytes)
    }

    fn put_brand(&self, wtxn: &mut RwTxn, brand: &Brand) -> Result<(), LmdbError> {
        let id = brand.id.to_be_bytes();
        self.brands_db.put(wtxn, &id, &encode(brand)?)?;
        self.brand_names_db.put(wtxn, brand.name.as_bytes(), &id)?;
        Ok(())
    }
}

impl BrandStore for LmdbStore {
    fn insert_brand(&self, draft: BrandDraft, now: Timestamp) -> Result<Brand, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.brand_id_by_name(&wtxn, draft.name.trim())?.is_some() {
            return Err(StoreError::Duplicate(draft.name));
        }
        let id = BrandId::new(self.allocate_id(&mut wtxn, NEXT_BRAND_ID)?);
        let brand = draft.into_brand(id, now);
        self.put_brand(&mut wtxn, &brand)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(brand)
    }

    fn get_brand(&self, id: BrandId) -> Result<Brand, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.load_brand(&rtxn, id)?)
    }

    fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.brand_id_by_name(&rtxn, name)? {
            Some(id) => Ok(Some(self.load_brand(&rtxn, id)?)),
            None => Ok(None),
        }
    }

    fn update_brand(&self, id: BrandId, draft: BrandDraft) -> Result<Brand, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existing = self.load_brand(&wtxn, id)?;
        if let Some(owner) = self.brand_id_by_name(&wtxn, draft.name.trim())? {
            if owner != id {
                return Err(StoreError::Duplicate(draft.name));
            }
        }
        let brand = draft.into_brand(id, existing.created_at);
        if brand.name != existing.name {
            self.brand_names_db
                .delete(&mut wtxn, existing.name.as_bytes())
                .map_err(LmdbError::from)?;
        }
        self.put_brand(&mut wtxn, &brand)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(brand)
    }

    fn delete_brand(&self, id: BrandId) -> Result<usize, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let brand = self.load_brand(&wtxn, id)?;
        self.brands_db
            .delete(&mut wtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?;
        self.brand_names_db
            .delete(&mut wtxn, brand.name.as_bytes())
            .map_err(LmdbError::from)?;
        let removed = self.delete_patterns_of(&mut wtxn, id)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::info!(brand = %brand.name, patterns = removed, "deleted brand");
        Ok(removed)
    }

    fn iter_brands(&self) -> Result<Vec<Brand>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_values(&self.brands_db, &rtxn)?)
    }

    fn brand_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.brands_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
