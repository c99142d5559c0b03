//! Submitted product identifiers and the heuristics applied to them.

use chrono::{DateTime, NaiveDate, Utc};

/// Earliest manufacturing date that earns the date bonus.
const EARLIEST_MANUFACTURING_DATE: (i32, u32, u32) = (2020, 1, 1);

const MIN_BATCH_LEN: usize = 4;
const MIN_SERIAL_LEN: usize = 6;
const MIN_BARCODE_LEN: usize = 8;

/// A complete, validated code triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductCodes {
    pub batch_number: String,
    pub serial_number: String,
    pub barcode: String,
}

impl ProductCodes {
    /// Build from optional fields; `None` unless all three are non-empty.
    pub fn from_parts(
        batch_number: Option<&str>,
        serial_number: Option<&str>,
        barcode: Option<&str>,
    ) -> Option<Self> {
        let present = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        Some(Self {
            batch_number: present(batch_number)?,
            serial_number: present(serial_number)?,
            barcode: present(barcode)?,
        })
    }

    /// `batch-serial-barcode`.
    pub fn combined(&self) -> String {
        format!("{}-{}-{}", self.batch_number, self.serial_number, self.barcode)
    }

    /// Matching candidates in test order: combined code, batch, serial, barcode.
    pub fn candidates(&self) -> [String; 4] {
        [
            self.combined(),
            self.batch_number.clone(),
            self.serial_number.clone(),
            self.barcode.clone(),
        ]
    }

    /// Whether every field meets its minimum plausible length.
    pub fn has_plausible_format(&self) -> bool {
        self.batch_number.chars().count() >= MIN_BATCH_LEN
            && self.serial_number.chars().count() >= MIN_SERIAL_LEN
            && self.barcode.chars().count() >= MIN_BARCODE_LEN
    }
}

/// Parse a submitted manufacturing date into an instant.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_manufacturing_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        Err(_) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// True when `raw` parses to an instant between 2020-01-01T00:00Z and `now`,
/// both inclusive.
pub fn is_plausible_manufacturing_date(raw: &str, now: DateTime<Utc>) -> bool {
    let (y, m, d) = EARLIEST_MANUFACTURING_DATE;
    let Some(earliest) = NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
    else {
        return false;
    };
    parse_manufacturing_date(raw).is_some_and(|at| at >= earliest && at <= now)
}
