//! LMDB implementation of VerificationLogStore.
//!
//! Attempts are keyed by big-endian `attempt_id`; paging newest-first is a
//! reverse range scan below the cursor. Per-result counts are kept in `meta`
//! and updated in the same transaction as the append.

use std::ops::Bound;

use acp_store::{LogStats, StoreError, VerificationLogStore};
use acp_types::{AttemptId, VerificationAttempt};

use crate::environment::{decode, encode};
use crate::keys::read_id;
use crate::meta::NEXT_ATTEMPT_ID;
use crate::{LmdbError, LmdbStore};

impl VerificationLogStore for LmdbStore {
    fn append_attempt(&self, attempt: &VerificationAttempt) -> Result<AttemptId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = AttemptId::new(self.allocate_id(&mut wtxn, NEXT_ATTEMPT_ID)?);
        self.attempts_db
            .put(&mut wtxn, &id.to_be_bytes(), &encode(attempt)?)
            .map_err(LmdbError::from)?;
        let mut stats = self.log_stats_in(&wtxn)?;
        stats.record(attempt.result);
        self.put_log_stats(&mut wtxn, &stats)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(id)
    }

    fn get_attempt(&self, id: AttemptId) -> Result<VerificationAttempt, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .attempts_db
            .get(&rtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("attempt {id}")))?;
        Ok(decode(bytes)?)
    }

    fn iter_attempts_desc(
        &self,
        before: Option<AttemptId>,
        limit: usize,
    ) -> Result<Vec<(AttemptId, VerificationAttempt)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let cursor = before.map(|id| id.to_be_bytes());
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (
            Bound::Unbounded,
            match cursor.as_ref() {
                Some(key) => Bound::Excluded(key.as_slice()),
                None => Bound::Unbounded,
            },
        );

        let mut page = Vec::new();
        for entry in self
            .attempts_db
            .rev_range(&rtxn, &bounds)
            .map_err(LmdbError::from)?
            .take(limit)
        {
            let (key, val) = entry.map_err(LmdbError::from)?;
            let id = read_id(key)
                .map(AttemptId::new)
                .ok_or_else(|| LmdbError::Schema("malformed attempt key".into()))?;
            page.push((id, decode(val)?));
        }
        Ok(page)
    }

    fn attempt_stats(&self) -> Result<LogStats, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.log_stats_in(&rtxn)?)
    }
}
