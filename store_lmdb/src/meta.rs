//! Bookkeeping kept in the `meta` database: schema version, id counters and
//! running log statistics.

use heed::{RoTxn, RwTxn};

use acp_store::LogStats;

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const LOG_STATS_KEY: &[u8] = b"log_stats";

pub(crate) const NEXT_BRAND_ID: &[u8] = b"next_brand_id";
pub(crate) const NEXT_PATTERN_ID: &[u8] = b"next_pattern_id";
pub(crate) const NEXT_ATTEMPT_ID: &[u8] = b"next_attempt_id";

fn read_u64_le(bytes: &[u8], key: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| {
        LmdbError::Serialization(format!(
            "meta key '{}' has unexpected byte length",
            String::from_utf8_lossy(key)
        ))
    })?;
    Ok(u64::from_le_bytes(arr))
}

impl LmdbStore {
    /// Allocate the next id from counter `key`. Ids start at 1.
    pub(crate) fn allocate_id(&self, wtxn: &mut RwTxn, key: &[u8]) -> Result<u64, LmdbError> {
        let last = match self.meta_db.get(wtxn, key)? {
            Some(bytes) => read_u64_le(bytes, key)?,
            None => 0,
        };
        let next = last
            .checked_add(1)
            .ok_or_else(|| LmdbError::Schema("id counter exhausted".into()))?;
        self.meta_db.put(wtxn, key, &next.to_le_bytes())?;
        Ok(next)
    }

    pub(crate) fn log_stats_in(&self, rtxn: &RoTxn) -> Result<LogStats, LmdbError> {
        match self.meta_db.get(rtxn, LOG_STATS_KEY)? {
            Some(bytes) => decode(bytes),
            None => Ok(LogStats::default()),
        }
    }

    pub(crate) fn put_log_stats(&self, wtxn: &mut RwTxn, stats: &LogStats) -> Result<(), LmdbError> {
        self.meta_db.put(wtxn, LOG_STATS_KEY, &encode(stats)?)?;
        Ok(())
    }

    /// Stored schema version; 0 for a fresh database.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("schema_version has unexpected byte length".into())
                })?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    pub fn set_schema_version(&self, version: u32) -> Result<(), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        self.meta_db
            .put(&mut wtxn, SCHEMA_VERSION_KEY, &version.to_le_bytes())?;
        wtxn.commit()?;
        Ok(())
    }
}
