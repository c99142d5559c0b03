//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the service starts
//! answering verification requests.

use std::path::Path;

use acp_types::{Brand, VerificationAttempt};
use heed::types::Bytes;

use crate::environment::{decode, DATABASES};
use crate::keys::read_id;
use crate::{LmdbError, LmdbStore};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check LMDB database integrity.
///
/// Counts the entries of every expected database, decodes every brand and
/// attempt, and checks that brand name and pattern indexes agree with their
/// records. Problems are collected in the report rather than failing hard.
pub fn check_integrity(store: &LmdbStore) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = store.env.read_txn()?;

    for &db_name in DATABASES {
        match store.env.open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{}': {}", db_name, e)),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{}' is missing", db_name)),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{}': {}", db_name, e)),
        }
    }

    for entry in store.brands_db.iter(&rtxn)? {
        let (key, val) = entry?;
        match decode::<Brand>(val) {
            Ok(brand) => {
                let indexed = store
                    .brand_names_db
                    .get(&rtxn, brand.name.as_bytes())?
                    .and_then(read_id);
                if indexed != Some(brand.id.as_u64()) || read_id(key) != Some(brand.id.as_u64()) {
                    report
                        .errors
                        .push(format!("brand {} has an inconsistent name index", brand.id));
                }
            }
            Err(e) => report.errors.push(format!("undecodable brand record: {e}")),
        }
    }

    for (records, index, kind) in [
        (&store.code_patterns_db, &store.code_pattern_index_db, "code"),
        (&store.fake_patterns_db, &store.fake_pattern_index_db, "fake"),
    ] {
        for entry in records.iter(&rtxn)? {
            let (key, _) = entry?;
            let (Some(brand), Some(pattern)) = (read_id(key), key.get(8..).and_then(read_id))
            else {
                report.errors.push(format!("malformed {kind} pattern key"));
                continue;
            };
            if store.brands_db.get(&rtxn, &brand.to_be_bytes())?.is_none() {
                report
                    .errors
                    .push(format!("{kind} pattern {pattern} belongs to missing brand {brand}"));
            }
            let indexed = index.get(&rtxn, &pattern.to_be_bytes())?.and_then(read_id);
            if indexed != Some(brand) {
                report
                    .errors
                    .push(format!("{kind} pattern {pattern} missing from its index"));
            }
        }
    }

    let mut attempts = 0u64;
    for entry in store.attempts_db.iter(&rtxn)? {
        let (_key, val) = entry?;
        attempts += 1;
        if let Err(e) = decode::<VerificationAttempt>(val) {
            report.errors.push(format!("undecodable attempt record: {e}"));
        }
    }
    let stats = store.log_stats_in(&rtxn)?;
    if stats.total != attempts {
        report.errors.push(format!(
            "log counters report {} attempts but {} are stored",
            stats.total, attempts
        ));
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
