//! Best-effort append to the verification log.

use acp_store::VerificationLogStore;
use acp_types::{AttemptId, VerificationAttempt};
use tracing::warn;

/// Result of trying to record an attempt.
///
/// A failed append never changes the verdict; the error text is handed back
/// so the caller can report it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditRecord {
    pub attempt_id: Option<AttemptId>,
    pub error: Option<String>,
}

pub fn record<L>(log: &L, attempt: &VerificationAttempt) -> AuditRecord
where
    L: VerificationLogStore + ?Sized,
{
    match log.append_attempt(attempt) {
        Ok(id) => AuditRecord {
            attempt_id: Some(id),
            error: None,
        },
        Err(e) => {
            warn!(
                method = attempt.method.as_str(),
                result = %attempt.result,
                error = %e,
                "failed to append verification attempt"
            );
            AuditRecord {
                attempt_id: None,
                error: Some(e.to_string()),
            }
        }
    }
}
