//! Code verification engine.
//!
//! Decision order, first hit wins:
//! 1. Any fake pattern matching any candidate: `fake`, score 20.
//! 2. Any genuine pattern matching any candidate: `verified`, score 90.
//! 3. Otherwise `pending`, scored 40 for plausible field lengths (30 if not),
//!    plus 10 for a manufacturing date between 2020-01-01 and the request time.
//!
//! Candidates are tested in the order combined code, batch, serial, barcode;
//! patterns in stored order.

use acp_store::{BrandPatterns, PatternRepository, VerificationLogStore};
use acp_types::{
    AttemptDetails, AttemptId, CodeDetails, PatternId, VerificationAttempt, VerificationMethod,
    VerificationResult,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::audit;
use crate::codes::{is_plausible_manufacturing_date, ProductCodes};
use crate::matcher::CompiledPattern;
use crate::{RequestContext, VerificationError};

pub const FAKE_MATCH_SCORE: i32 = 20;
pub const GENUINE_MATCH_SCORE: i32 = 90;
pub const PLAUSIBLE_FORMAT_SCORE: i32 = 40;
pub const IMPLAUSIBLE_FORMAT_SCORE: i32 = 30;
pub const DATE_BONUS: i32 = 10;
/// Ceiling applied if a verdict of `verified` ever lacks a genuine match.
pub const UNBACKED_VERIFIED_CAP: i32 = 60;

/// A code verification request as submitted.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub batch_number: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub manufacturing_date: Option<String>,
}

impl CodeRequest {
    fn validate(&self) -> Result<ProductCodes, VerificationError> {
        if self.brand.is_empty() {
            return Err(VerificationError::InvalidInput("brand is required".into()));
        }
        ProductCodes::from_parts(
            Some(self.batch_number.as_str()),
            Some(self.serial_number.as_str()),
            Some(self.barcode.as_str()),
        )
        .ok_or_else(|| {
            VerificationError::InvalidInput(
                "batchNumber, serialNumber and barcode are required".into(),
            )
        })
    }
}

/// The pure scoring result for one code triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeScore {
    pub result: VerificationResult,
    /// Clamped to `0..=100`.
    pub score: i32,
    pub matched_genuine: bool,
    pub matched_fake: bool,
    pub matched_pattern_id: Option<PatternId>,
}

impl CodeScore {
    pub fn matched_any_pattern(&self) -> bool {
        self.matched_genuine || self.matched_fake
    }
}

/// What the caller gets back from [`CodeVerificationEngine::verify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeOutcome {
    pub result: VerificationResult,
    pub score: u8,
    /// The stored brand name when resolved, else the submitted name.
    pub brand: String,
    pub brand_resolved: bool,
    pub matched_pattern: bool,
    pub attempt_id: Option<AttemptId>,
    /// Set when the log append failed; the verdict still stands.
    pub audit_error: Option<String>,
}

impl CodeOutcome {
    pub fn message(&self) -> &'static str {
        match self.result {
            VerificationResult::Verified => "Product appears to be authentic",
            VerificationResult::Fake => "Product may be counterfeit",
            VerificationResult::Pending => "Verification pending",
        }
    }
}

fn first_match<'a, I>(patterns: I, candidates: &[String]) -> Option<PatternId>
where
    I: IntoIterator<Item = (PatternId, &'a str)>,
{
    patterns.into_iter().find_map(|(id, pattern)| {
        let compiled = CompiledPattern::compile(pattern);
        candidates
            .iter()
            .any(|candidate| compiled.is_match(candidate))
            .then_some(id)
    })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CodeVerificationEngine;

impl CodeVerificationEngine {
    /// Score a code triple against a brand's pattern snapshot.
    ///
    /// Pure: the same snapshot, codes, date and `now` give the same score.
    pub fn score(
        &self,
        patterns: &BrandPatterns,
        codes: &ProductCodes,
        manufacturing_date: Option<&str>,
        now: DateTime<Utc>,
    ) -> CodeScore {
        let candidates = codes.candidates();

        let fake_hit = first_match(
            patterns.fake.iter().map(|p| (p.id, p.pattern.as_str())),
            &candidates,
        );
        let genuine_hit = if fake_hit.is_none() {
            first_match(
                patterns.genuine.iter().map(|p| (p.id, p.pattern.as_str())),
                &candidates,
            )
        } else {
            None
        };

        let matched_fake = fake_hit.is_some();
        let matched_genuine = genuine_hit.is_some();

        let (mut result, mut score) = if matched_fake {
            (VerificationResult::Fake, FAKE_MATCH_SCORE)
        } else if matched_genuine {
            (VerificationResult::Verified, GENUINE_MATCH_SCORE)
        } else {
            let mut score = if codes.has_plausible_format() {
                PLAUSIBLE_FORMAT_SCORE
            } else {
                IMPLAUSIBLE_FORMAT_SCORE
            };
            if manufacturing_date.is_some_and(|d| is_plausible_manufacturing_date(d, now)) {
                score += DATE_BONUS;
            }
            (VerificationResult::Pending, score)
        };

        // `verified` must be backed by a genuine match.
        if result == VerificationResult::Verified && !matched_genuine {
            result = VerificationResult::Pending;
            score = score.min(UNBACKED_VERIFIED_CAP);
        }

        CodeScore {
            result,
            score: score.clamp(0, 100),
            matched_genuine,
            matched_fake,
            matched_pattern_id: fake_hit.or(genuine_hit),
        }
    }

    /// Validate, look up the brand's patterns, score, and log the attempt.
    ///
    /// Validation and repository failures return before anything is logged.
    /// A log failure is reported in [`CodeOutcome::audit_error`].
    pub fn verify<R, L>(
        &self,
        repo: &R,
        log: &L,
        request: &CodeRequest,
        ctx: &RequestContext,
    ) -> Result<CodeOutcome, VerificationError>
    where
        R: PatternRepository + ?Sized,
        L: VerificationLogStore + ?Sized,
    {
        let codes = request.validate()?;
        let patterns = repo.lookup(&request.brand)?;
        if !patterns.is_resolved() {
            debug!(brand = %request.brand, "brand not registered, scoring without patterns");
        }

        let scored = self.score(
            &patterns,
            &codes,
            request.manufacturing_date.as_deref(),
            ctx.now_utc(),
        );

        let attempt = VerificationAttempt::new(
            VerificationMethod::Code,
            Some(request.brand.clone()),
            scored.score,
            scored.result,
            ctx.now,
            ctx.origin.clone(),
            AttemptDetails::Code(CodeDetails {
                product_code: codes.combined(),
                batch_number: codes.batch_number,
                serial_number: codes.serial_number,
                barcode: codes.barcode,
                manufacturing_date: request.manufacturing_date.clone(),
            }),
            ctx.submitter.clone(),
        );
        let audit = audit::record(log, &attempt);

        info!(
            brand = %request.brand,
            result = %scored.result,
            score = attempt.score,
            pattern = ?scored.matched_pattern_id,
            "code verification"
        );

        Ok(CodeOutcome {
            result: scored.result,
            score: attempt.score,
            brand: patterns
                .brand
                .as_ref()
                .map(|b| b.name.clone())
                .unwrap_or_else(|| request.brand.clone()),
            brand_resolved: patterns.is_resolved(),
            matched_pattern: scored.matched_any_pattern(),
            attempt_id: audit.attempt_id,
            audit_error: audit.error,
        })
    }
}
