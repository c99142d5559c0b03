//! Abstract storage traits for Authenticity Check Pro.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The verification engines and the HTTP layer depend only on the
//! traits, never on a concrete backend.

pub mod brand;
pub mod error;
pub mod log;
pub mod pattern;
pub mod repository;

pub use brand::BrandStore;
pub use error::StoreError;
pub use log::{LogStats, VerificationLogStore};
pub use pattern::PatternStore;
pub use repository::{BrandPatterns, PatternRepository};

/// Everything a running service needs from its backend.
///
/// Blanket-implemented for any type providing all three stores, so handlers
/// can hold an `Arc<dyn Store>`.
pub trait Store: BrandStore + PatternStore + VerificationLogStore + Send + Sync {}

impl<T> Store for T where T: BrandStore + PatternStore + VerificationLogStore + Send + Sync {}
