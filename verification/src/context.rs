//! Per-request facts supplied by the caller.

use acp_types::Timestamp;
use chrono::{DateTime, Utc};

/// Who asked, from where, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    /// Submitter network origin; `"unknown"` if the transport did not say.
    pub origin: String,
    pub submitter: Option<String>,
    pub now: Timestamp,
}

impl RequestContext {
    pub fn new(origin: impl Into<String>, now: Timestamp) -> Self {
        Self {
            origin: origin.into(),
            submitter: None,
            now,
        }
    }

    pub fn with_submitter(mut self, submitter: Option<String>) -> Self {
        self.submitter = submitter.filter(|s| !s.is_empty());
        self
    }

    /// `now` as a UTC instant.
    pub fn now_utc(&self) -> DateTime<Utc> {
        i64::try_from(self.now.as_secs())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
