//! HTTP API for Authenticity Check Pro.
//!
//! Provides endpoints for:
//! - Code and image verification
//! - The public brand catalogue
//! - Verification history
//! - Brand and pattern administration, guarded by a bearer token
//! - Service health and statistics

pub mod auth;
pub mod error;
pub mod handlers;
pub mod origin;
pub mod pagination;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use server::{build_router, RpcServer};
pub use state::AppState;
