//! Domain records for Authenticity Check Pro.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! brands, genuine and counterfeit code patterns, verification attempts,
//! timestamps and the verdict enums produced by the scoring engines.

pub mod attempt;
pub mod brand;
pub mod error;
pub mod id;
pub mod pattern;
pub mod state;
pub mod time;

pub use attempt::{AttemptDetails, CodeDetails, ImageAnalysis, ImageDetails, VerificationAttempt};
pub use brand::{Brand, BrandDraft};
pub use error::AcpError;
pub use id::{AttemptId, BrandId, PatternId};
pub use pattern::{CodePattern, CodePatternDraft, FakePattern, FakePatternDraft};
pub use state::{RiskLevel, VerificationMethod, VerificationResult};
pub use time::{Clock, SystemClock, Timestamp};
