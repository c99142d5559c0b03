//! Verification log entries.
//!
//! One [`VerificationAttempt`] is appended per verification call, whatever the
//! verdict. Entries are immutable once written.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, VerificationMethod, VerificationResult};

/// An immutable record of one verification request and its outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationAttempt {
    pub method: VerificationMethod,
    /// Brand name as submitted. Free text; may not match a stored brand.
    pub brand: Option<String>,
    /// Always within `0..=100`.
    pub score: u8,
    pub result: VerificationResult,
    pub timestamp: Timestamp,
    /// Network origin of the submitter, `"unknown"` when not reported.
    pub origin: String,
    pub details: AttemptDetails,
    pub submitter: Option<String>,
}

impl VerificationAttempt {
    /// Build an entry, clamping `score` into `0..=100`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        method: VerificationMethod,
        brand: Option<String>,
        score: i32,
        result: VerificationResult,
        timestamp: Timestamp,
        origin: impl Into<String>,
        details: AttemptDetails,
        submitter: Option<String>,
    ) -> Self {
        Self {
            method,
            brand,
            score: score.clamp(0, 100) as u8,
            result,
            timestamp,
            origin: origin.into(),
            details,
            submitter,
        }
    }
}

/// Submitted fields and derived flags, per verification method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptDetails {
    Code(CodeDetails),
    Image(ImageDetails),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDetails {
    pub batch_number: String,
    pub serial_number: String,
    pub barcode: String,
    pub manufacturing_date: Option<String>,
    /// `batch-serial-barcode`, the combined matching candidate.
    pub product_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    pub image_count: u32,
    /// Placeholder storage locations, one per submitted image.
    pub image_urls: Vec<String>,
    pub batch_number: Option<String>,
    pub serial_number: Option<String>,
    pub barcode: Option<String>,
    pub manufacturing_date: Option<String>,
    /// Verdict of the inner code verification, when codes were complete.
    pub code_verification: Option<VerificationResult>,
    pub analysis: ImageAnalysis,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Set when the submitter named a brand.
    pub logo_detected: Option<bool>,
    pub has_code_verification: bool,
}
