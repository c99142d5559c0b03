//! LMDB environment setup.

use std::fs;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::keys::prefix_upper_bound;
use crate::LmdbError;

/// Databases created in every environment, in creation order.
pub(crate) const DATABASES: &[&str] = &[
    "brands",
    "brand_names",
    "code_patterns",
    "code_pattern_index",
    "fake_patterns",
    "fake_pattern_index",
    "attempts",
    "meta",
];

const MAX_DBS: u32 = 16;

/// The LMDB-backed store: one environment, all database handles.
///
/// - `brands`: `brand_id` → `Brand`
/// - `brand_names`: name bytes → `brand_id`
/// - `code_patterns` / `fake_patterns`: `brand_id ++ pattern_id` → record
/// - `code_pattern_index` / `fake_pattern_index`: `pattern_id` → `brand_id`
/// - `attempts`: `attempt_id` → `VerificationAttempt`
/// - `meta`: schema version, id counters, log statistics
#[derive(Clone)]
pub struct LmdbStore {
    pub(crate) env: Arc<Env>,
    pub(crate) brands_db: Database<Bytes, Bytes>,
    pub(crate) brand_names_db: Database<Bytes, Bytes>,
    pub(crate) code_patterns_db: Database<Bytes, Bytes>,
    pub(crate) code_pattern_index_db: Database<Bytes, Bytes>,
    pub(crate) fake_patterns_db: Database<Bytes, Bytes>,
    pub(crate) fake_pattern_index_db: Database<Bytes, Bytes>,
    pub(crate) attempts_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open or create an LMDB environment at `path`, creating any missing
    /// databases.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process and the data
        // files are not modified by anything else while it is open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let mut create = |name: &str| -> Result<Database<Bytes, Bytes>, LmdbError> {
            Ok(env.create_database::<Bytes, Bytes>(&mut wtxn, Some(name))?)
        };
        let brands_db = create("brands")?;
        let brand_names_db = create("brand_names")?;
        let code_patterns_db = create("code_patterns")?;
        let code_pattern_index_db = create("code_pattern_index")?;
        let fake_patterns_db = create("fake_patterns")?;
        let fake_pattern_index_db = create("fake_pattern_index")?;
        let attempts_db = create("attempts")?;
        let meta_db = create("meta")?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            brands_db,
            brand_names_db,
            code_patterns_db,
            code_pattern_index_db,
            fake_patterns_db,
            fake_pattern_index_db,
            attempts_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Prefix range-scan: decode all values whose key starts with `prefix`.
pub(crate) fn range_scan_values<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<T>, LmdbError> {
    let upper = prefix_upper_bound(prefix);
    let bounds = (
        Bound::Included(prefix),
        match upper.as_deref() {
            Some(upper) => Bound::Excluded(upper),
            None => Bound::Unbounded,
        },
    );
    let mut results = Vec::new();
    for entry in db.range(rtxn, &bounds)? {
        let (_key, val) = entry?;
        results.push(decode(val)?);
    }
    Ok(results)
}

/// Decode every value in `db`, in key order.
pub(crate) fn scan_values<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn,
) -> Result<Vec<T>, LmdbError> {
    let mut results = Vec::new();
    for entry in db.iter(rtxn)? {
        let (_key, val) = entry?;
        results.push(decode(val)?);
    }
    Ok(results)
}
