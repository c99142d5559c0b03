//! Append-only verification log trait.

use crate::StoreError;
use acp_types::{AttemptId, VerificationAttempt, VerificationResult};
use serde::{Deserialize, Serialize};

/// Aggregate counts over the verification log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub total: u64,
    pub verified: u64,
    pub fake: u64,
    pub pending: u64,
}

impl LogStats {
    pub fn record(&mut self, result: VerificationResult) {
        self.total += 1;
        match result {
            VerificationResult::Verified => self.verified += 1,
            VerificationResult::Fake => self.fake += 1,
            VerificationResult::Pending => self.pending += 1,
        }
    }
}

/// Trait for the verification audit trail.
///
/// Entries are never mutated or deleted once appended.
pub trait VerificationLogStore {
    /// Append an entry and return its assigned id.
    fn append_attempt(&self, attempt: &VerificationAttempt) -> Result<AttemptId, StoreError>;

    fn get_attempt(&self, id: AttemptId) -> Result<VerificationAttempt, StoreError>;

    /// Newest-first page of entries with ids strictly below `before`
    /// (or from the newest entry if `None`).
    fn iter_attempts_desc(
        &self,
        before: Option<AttemptId>,
        limit: usize,
    ) -> Result<Vec<(AttemptId, VerificationAttempt)>, StoreError>;

    fn attempt_stats(&self) -> Result<LogStats, StoreError>;
}
