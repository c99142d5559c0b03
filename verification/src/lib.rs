//! Authenticity verification scoring.
//!
//! Two entry points share one decision procedure:
//! 1. **Code verification**: batch number, serial number and barcode are
//!    tested against the brand's registered counterfeit patterns first, then
//!    its genuine patterns, then weak format heuristics.
//! 2. **Image verification**: the image count and brand selection add small
//!    bonuses; when complete codes accompany the images, the code verdict is
//!    authoritative. Images alone never yield `verified` or `fake`.
//!
//! Pattern data is read through [`acp_store::PatternRepository`] and every
//! attempt is appended to an [`acp_store::VerificationLogStore`]. The scoring
//! itself is pure and deterministic given the pattern snapshot and the clock.

pub mod audit;
pub mod code;
pub mod codes;
pub mod context;
pub mod error;
pub mod image;
pub mod matcher;

pub use code::{CodeOutcome, CodeRequest, CodeScore, CodeVerificationEngine};
pub use codes::ProductCodes;
pub use context::RequestContext;
pub use error::VerificationError;
pub use image::{ImageMessage, ImageOutcome, ImageRequest, ImageUpload, ImageVerificationEngine};
pub use matcher::{matches, CompiledPattern, PatternKind};
