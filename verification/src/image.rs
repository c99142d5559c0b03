//! Image verification engine.
//!
//! Only the number of images is used; there is no pixel analysis. With a brand
//! and a complete code triple, the code verdict decides the result and the
//! images adjust the score. Without them the result is always `pending` and
//! the score never exceeds [`IMAGE_ONLY_CAP`].

use acp_store::{PatternRepository, VerificationLogStore};
use acp_types::{
    AttemptDetails, AttemptId, ImageAnalysis, ImageDetails, VerificationAttempt,
    VerificationMethod, VerificationResult,
};
use std::fmt;
use tracing::info;

use crate::audit;
use crate::code::{CodeVerificationEngine, FAKE_MATCH_SCORE};
use crate::codes::ProductCodes;
use crate::{RequestContext, VerificationError};

pub const CODE_VERIFIED_BASE: i32 = 85;
pub const CODE_PENDING_BASE: i32 = 35;
pub const IMAGE_ONLY_BASE: i32 = 40;
pub const IMAGE_ONLY_CAP: i32 = 55;
pub const FAKE_FLOOR: i32 = 15;
pub const FAKE_PENALTY: i32 = 10;
pub const BRAND_BONUS: i32 = 5;

/// Bonus for the number of images submitted.
pub fn image_score(count: usize) -> i32 {
    match count {
        0 | 1 => 5,
        2 => 10,
        _ => 15,
    }
}

/// Metadata of one uploaded image. The bytes themselves are not inspected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub size: usize,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, size: usize) -> Self {
        Self {
            file_name: file_name.into(),
            size,
        }
    }
}

/// An image verification request. Empty strings are treated as absent.
#[derive(Clone, Debug, Default)]
pub struct ImageRequest {
    pub images: Vec<ImageUpload>,
    pub brand: Option<String>,
    pub batch_number: Option<String>,
    pub serial_number: Option<String>,
    pub barcode: Option<String>,
    pub manufacturing_date: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl ImageRequest {
    pub fn brand(&self) -> Option<&str> {
        present(&self.brand)
    }

    fn codes(&self) -> Option<ProductCodes> {
        ProductCodes::from_parts(
            present(&self.batch_number),
            present(&self.serial_number),
            present(&self.barcode),
        )
    }
}

/// Caller-facing explanation of an image verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageMessage {
    VerifiedByCodes,
    CounterfeitCodes,
    /// Pending because no brand was selected.
    MissingBrand,
    /// Pending because a brand was selected without a batch number.
    MissingCodes { brand: String },
    /// Pending because a batch number came without its serial number or barcode.
    IncompleteCodes,
    /// Pending because the supplied codes matched nothing.
    CodesUnmatched,
}

impl ImageMessage {
    pub fn text(&self) -> String {
        match self {
            Self::VerifiedByCodes => {
                "Product appears to be authentic based on code and image analysis".into()
            }
            Self::CounterfeitCodes => {
                "Product detected as fake: codes match known counterfeit patterns. Do not purchase."
                    .into()
            }
            Self::MissingBrand => "Cannot verify authenticity from images alone. Select the brand \
                 and enter the batch number, serial number and barcode shown on the product."
                .into(),
            Self::MissingCodes { brand } => format!(
                "Image-only verification for {brand} cannot confirm authenticity. Enter the batch \
                 number, serial number and barcode from the product."
            ),
            Self::IncompleteCodes => "Image analysis cannot definitively verify authenticity. \
                 Add product codes for accurate fake detection."
                .into(),
            Self::CodesUnmatched => {
                "Codes provided but do not match known patterns; manual review recommended".into()
            }
        }
    }
}

impl fmt::Display for ImageMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageOutcome {
    pub result: VerificationResult,
    pub score: u8,
    pub image_count: usize,
    /// The inner code verdict, when codes were complete.
    pub code_verification: Option<VerificationResult>,
    pub brand: Option<String>,
    pub message: ImageMessage,
    pub attempt_id: Option<AttemptId>,
    pub audit_error: Option<String>,
}

/// Scores image submissions, delegating to [`CodeVerificationEngine`] when
/// codes are present.
#[derive(Clone, Debug)]
pub struct ImageVerificationEngine {
    upload_prefix: String,
    code: CodeVerificationEngine,
}

impl Default for ImageVerificationEngine {
    fn default() -> Self {
        Self::new("/uploads")
    }
}

impl ImageVerificationEngine {
    pub fn new(upload_prefix: impl Into<String>) -> Self {
        Self {
            upload_prefix: upload_prefix.into().trim_end_matches('/').to_string(),
            code: CodeVerificationEngine,
        }
    }

    fn placeholder_urls(&self, images: &[ImageUpload], ctx: &RequestContext) -> Vec<String> {
        images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                format!(
                    "{}/{}-{}-{}",
                    self.upload_prefix,
                    ctx.now.as_secs(),
                    index,
                    image.file_name
                )
            })
            .collect()
    }

    pub fn verify<R, L>(
        &self,
        repo: &R,
        log: &L,
        request: &ImageRequest,
        ctx: &RequestContext,
    ) -> Result<ImageOutcome, VerificationError>
    where
        R: PatternRepository + ?Sized,
        L: VerificationLogStore + ?Sized,
    {
        if request.images.is_empty() {
            return Err(VerificationError::InvalidInput(
                "at least one image is required".into(),
            ));
        }

        let image_count = request.images.len();
        let img = image_score(image_count);
        let brand = request.brand();
        let codes = request.codes();

        let patterns = match brand {
            Some(name) => Some(repo.lookup(name)?),
            None => None,
        };
        let bonus = if patterns.as_ref().is_some_and(|p| p.is_resolved()) {
            BRAND_BONUS
        } else {
            0
        };

        let (result, score, code_verification, message) = match (brand, &codes, &patterns) {
            (Some(_), Some(codes), Some(patterns)) => {
                let scored = self.code.score(
                    patterns,
                    codes,
                    present(&request.manufacturing_date),
                    ctx.now_utc(),
                );
                let (score, message) = match scored.result {
                    VerificationResult::Verified => (
                        (CODE_VERIFIED_BASE + img + bonus).min(100),
                        ImageMessage::VerifiedByCodes,
                    ),
                    VerificationResult::Fake => (
                        FAKE_FLOOR.max(FAKE_MATCH_SCORE - FAKE_PENALTY),
                        ImageMessage::CounterfeitCodes,
                    ),
                    VerificationResult::Pending => {
                        (CODE_PENDING_BASE + img + bonus, ImageMessage::CodesUnmatched)
                    }
                };
                (scored.result, score, Some(scored.result), message)
            }
            (Some(name), _, _) => {
                let message = if present(&request.batch_number).is_some() {
                    ImageMessage::IncompleteCodes
                } else {
                    ImageMessage::MissingCodes {
                        brand: name.to_string(),
                    }
                };
                (
                    VerificationResult::Pending,
                    (IMAGE_ONLY_BASE + img + bonus).min(IMAGE_ONLY_CAP),
                    None,
                    message,
                )
            }
            (None, _, _) => (
                VerificationResult::Pending,
                (IMAGE_ONLY_BASE + img).min(IMAGE_ONLY_CAP),
                None,
                ImageMessage::MissingBrand,
            ),
        };

        let attempt = VerificationAttempt::new(
            VerificationMethod::Image,
            brand.map(str::to_string),
            score,
            result,
            ctx.now,
            ctx.origin.clone(),
            AttemptDetails::Image(ImageDetails {
                image_count: u32::try_from(image_count).unwrap_or(u32::MAX),
                image_urls: self.placeholder_urls(&request.images, ctx),
                batch_number: present(&request.batch_number).map(str::to_string),
                serial_number: present(&request.serial_number).map(str::to_string),
                barcode: present(&request.barcode).map(str::to_string),
                manufacturing_date: present(&request.manufacturing_date).map(str::to_string),
                code_verification,
                analysis: ImageAnalysis {
                    logo_detected: brand.map(|_| true),
                    has_code_verification: code_verification.is_some(),
                },
            }),
            ctx.submitter.clone(),
        );
        let audit = audit::record(log, &attempt);

        info!(
            brand = brand.unwrap_or("-"),
            images = image_count,
            result = %result,
            score = attempt.score,
            "image verification"
        );

        Ok(ImageOutcome {
            result,
            score: attempt.score,
            image_count,
            code_verification,
            brand: brand.map(str::to_string),
            message,
            attempt_id: audit.attempt_id,
            audit_error: audit.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acp_nullables::NullStore;
    use acp_types::Timestamp;

    const NOW: u64 = 1_717_200_000;

    fn ctx() -> RequestContext {
        RequestContext::new("unknown", Timestamp::new(NOW))
    }

    fn images(n: usize) -> Vec<ImageUpload> {
        (0..n).map(|i| ImageUpload::new(format!("photo{i}.jpg"), 1024)).collect()
    }

    fn dior() -> NullStore {
        let store = NullStore::new();
        store.seed_brand("Dior", &["^DR[0-9]{6}$"], &["^FAKE"]);
        store
    }

    fn with_codes(brand: &str, batch: &str, n: usize) -> ImageRequest {
        ImageRequest {
            images: images(n),
            brand: Some(brand.into()),
            batch_number: Some(batch.into()),
            serial_number: Some("SN000001".into()),
            barcode: Some("3348901234567".into()),
            manufacturing_date: None,
        }
    }

    #[test]
    fn image_score_steps() {
        assert_eq!(image_score(1), 5);
        assert_eq!(image_score(2), 10);
        assert_eq!(image_score(3), 15);
        assert_eq!(image_score(12), 15);
    }

    #[test]
    fn verified_codes_with_three_images_reach_one_hundred() {
        let store = dior();
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &with_codes("Dior", "DR123456", 3), &ctx())
            .unwrap();
        assert_eq!(outcome.result, VerificationResult::Verified);
        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.code_verification, Some(VerificationResult::Verified));
        assert_eq!(outcome.message, ImageMessage::VerifiedByCodes);
    }

    #[test]
    fn verified_codes_with_one_image() {
        let store = dior();
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &with_codes("Dior", "DR123456", 1), &ctx())
            .unwrap();
        assert_eq!(outcome.score, 95);
    }

    #[test]
    fn fake_codes_always_score_fifteen() {
        let store = dior();
        for n in 1..=4 {
            let outcome = ImageVerificationEngine::default()
                .verify(&store, &store, &with_codes("Dior", "FAKE0001", n), &ctx())
                .unwrap();
            assert_eq!(outcome.result, VerificationResult::Fake);
            assert_eq!(outcome.score, 15);
            assert_eq!(outcome.message, ImageMessage::CounterfeitCodes);
        }
    }

    #[test]
    fn unmatched_codes_are_pending() {
        let store = dior();
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &with_codes("Dior", "XX99", 2), &ctx())
            .unwrap();
        assert_eq!(outcome.result, VerificationResult::Pending);
        assert_eq!(outcome.score, 35 + 10 + 5);
        assert_eq!(outcome.code_verification, Some(VerificationResult::Pending));
        assert_eq!(outcome.message, ImageMessage::CodesUnmatched);
    }

    #[test]
    fn unknown_brand_with_codes_gets_no_bonus() {
        let store = dior();
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &with_codes("Chanel", "DR123456", 1), &ctx())
            .unwrap();
        assert_eq!(outcome.result, VerificationResult::Pending);
        assert_eq!(outcome.score, 35 + 5);
    }

    #[test]
    fn images_alone_are_pending() {
        let store = dior();
        let request = ImageRequest {
            images: images(1),
            ..Default::default()
        };
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &request, &ctx())
            .unwrap();
        assert_eq!(outcome.result, VerificationResult::Pending);
        assert_eq!(outcome.score, 45);
        assert_eq!(outcome.code_verification, None);
        assert_eq!(outcome.message, ImageMessage::MissingBrand);
    }

    #[test]
    fn brand_without_codes_is_capped() {
        let store = dior();
        let request = ImageRequest {
            images: images(5),
            brand: Some("Dior".into()),
            batch_number: Some(String::new()),
            serial_number: Some("SN000001".into()),
            ..Default::default()
        };
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &request, &ctx())
            .unwrap();
        assert_eq!(outcome.result, VerificationResult::Pending);
        assert_eq!(outcome.score, 55);
        assert_eq!(
            outcome.message,
            ImageMessage::MissingCodes {
                brand: "Dior".into()
            }
        );
        assert!(outcome.message.text().contains("Dior"));
    }

    #[test]
    fn batch_without_serial_or_barcode_is_incomplete() {
        let store = dior();
        let request = ImageRequest {
            images: images(1),
            brand: Some("Dior".into()),
            batch_number: Some("DR123456".into()),
            serial_number: Some(String::new()),
            ..Default::default()
        };
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &request, &ctx())
            .unwrap();
        assert_eq!(outcome.result, VerificationResult::Pending);
        assert_eq!(outcome.score, 40 + 5 + 5);
        assert_eq!(outcome.code_verification, None);
        assert_eq!(outcome.message, ImageMessage::IncompleteCodes);
        assert!(outcome.message.text().starts_with("Image analysis cannot definitively"));
    }

    #[test]
    fn empty_brand_counts_as_missing() {
        let store = dior();
        let request = ImageRequest {
            images: images(2),
            brand: Some(String::new()),
            ..Default::default()
        };
        let outcome = ImageVerificationEngine::default()
            .verify(&store, &store, &request, &ctx())
            .unwrap();
        assert_eq!(outcome.brand, None);
        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.message, ImageMessage::MissingBrand);
    }

    #[test]
    fn zero_images_rejected_without_logging() {
        let store = dior();
        let err = ImageVerificationEngine::default()
            .verify(&store, &store, &with_codes("Dior", "DR123456", 0), &ctx())
            .unwrap_err();
        assert!(matches!(err, VerificationError::InvalidInput(_)));
        assert_eq!(store.attempt_count(), 0);
    }

    #[test]
    fn log_entry_records_placeholders_and_inner_verdict() {
        let store = dior();
        ImageVerificationEngine::new("/media/")
            .verify(&store, &store, &with_codes("Dior", "DR123456", 2), &ctx())
            .unwrap();
        let attempt = store.last_attempt().unwrap();
        assert_eq!(attempt.method, VerificationMethod::Image);
        assert_eq!(attempt.brand.as_deref(), Some("Dior"));
        let AttemptDetails::Image(details) = attempt.details else {
            panic!("expected image details");
        };
        assert_eq!(details.image_count, 2);
        assert_eq!(
            details.image_urls,
            vec![
                format!("/media/{NOW}-0-photo0.jpg"),
                format!("/media/{NOW}-1-photo1.jpg"),
            ]
        );
        assert_eq!(details.code_verification, Some(VerificationResult::Verified));
        assert_eq!(details.analysis.logo_detected, Some(true));
        assert!(details.analysis.has_code_verification);
    }

    #[test]
    fn repository_failure_propagates() {
        let store = dior();
        store.set_fail_reads(true);
        let err = ImageVerificationEngine::default()
            .verify(&store, &store, &with_codes("Dior", "DR123456", 1), &ctx())
            .unwrap_err();
        assert!(matches!(err, VerificationError::RepositoryUnavailable(_)));
    }
}
