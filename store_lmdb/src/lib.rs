//! LMDB storage backend for Authenticity Check Pro.
//!
//! Implements all storage traits from `acp-store` using the `heed` LMDB bindings.
//! Each logical record kind maps to one or more named databases within a
//! single environment; values are `bincode`-encoded.

pub mod brand;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod keys;
pub mod log;
pub mod meta;
pub mod migration;
pub mod pattern;

pub use environment::LmdbStore;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
