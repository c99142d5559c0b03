//! Route handlers.

pub mod admin;
pub mod public;
pub mod verify;
