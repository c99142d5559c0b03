//! Database schema migration engine.
//!
//! Tracks a monotonically increasing schema version in `meta` and runs
//! sequential migration steps to bring an older database up to date.

use acp_store::LogStats;
use acp_types::VerificationAttempt;

use crate::environment::decode;
use crate::{LmdbError, LmdbStore};

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Runs database migrations to bring the schema up to date.
pub struct Migrator;

impl Migrator {
    /// Check the stored schema version and run any needed migrations.
    ///
    /// - Version 0 means a fresh database (no version stored yet).
    /// - If the stored version matches `CURRENT_SCHEMA_VERSION`, this is a no-op.
    /// - A stored version *higher* than supported was written by a newer
    ///   build and is refused.
    pub fn run(store: &LmdbStore) -> Result<(), LmdbError> {
        let current = store.schema_version()?;

        if current == CURRENT_SCHEMA_VERSION {
            tracing::info!(version = current, "database schema is up to date");
            return Ok(());
        }

        if current > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::Schema(format!(
                "database schema version {} is newer than supported version {}",
                current, CURRENT_SCHEMA_VERSION
            )));
        }

        for version in current..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "running migration");
            run_migration(store, version, version + 1)?;
        }

        store.set_schema_version(CURRENT_SCHEMA_VERSION)?;

        tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
        Ok(())
    }
}

fn run_migration(store: &LmdbStore, from: u32, to: u32) -> Result<(), LmdbError> {
    match (from, to) {
        // Initial schema: databases are created on open.
        (0, 1) => Ok(()),
        // v2: per-result log counters live in meta. Rebuild them from the log.
        (1, 2) => rebuild_log_stats(store),
        _ => Err(LmdbError::Schema(format!(
            "unknown migration: {} -> {}",
            from, to
        ))),
    }
}

fn rebuild_log_stats(store: &LmdbStore) -> Result<(), LmdbError> {
    let mut wtxn = store.env.write_txn()?;
    let mut stats = LogStats::default();
    for entry in store.attempts_db.iter(&wtxn)? {
        let (_key, val) = entry?;
        let attempt: VerificationAttempt = decode(val)?;
        stats.record(attempt.result);
    }
    store.put_log_stats(&mut wtxn, &stats)?;
    wtxn.commit()?;
    tracing::info!(total = stats.total, "rebuilt verification log counters");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbStore::open(dir.path(), 1 << 24).unwrap();
        assert_eq!(store.schema_version().unwrap(), 0);
        Migrator::run(&store).unwrap();
        assert_eq!(store.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
        // Second run is a no-op.
        Migrator::run(&store).unwrap();
    }

    #[test]
    fn newer_schema_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbStore::open(dir.path(), 1 << 24).unwrap();
        store.set_schema_version(CURRENT_SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(Migrator::run(&store), Err(LmdbError::Schema(_))));
    }

    #[test]
    fn unknown_migration_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbStore::open(dir.path(), 1 << 24).unwrap();
        assert!(run_migration(&store, 99, 100).is_err());
    }
}
