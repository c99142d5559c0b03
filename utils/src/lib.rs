//! Shared utilities for Authenticity Check Pro.

pub mod logging;
pub mod stats;
pub mod time;

pub use logging::{init_tracing, LogFormat, LoggingError};
pub use stats::StatsCounter;
pub use time::format_duration;
