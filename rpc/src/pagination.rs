//! Cursor-based pagination for the history endpoint.
//!
//! The cursor is the id of the last attempt on the previous page; the next
//! page holds attempts with strictly smaller ids.

use acp_types::AttemptId;
use serde::{Deserialize, Serialize};

use crate::RpcError;

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Common pagination parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Cursor from a previous response.
    pub cursor: Option<String>,
    /// Number of items per page (default 100, max 1000).
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Resolve effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// The attempt id to page below; `None` starts from the newest entry.
    pub fn before(&self) -> Result<Option<AttemptId>, RpcError> {
        match self.cursor.as_deref().filter(|c| !c.is_empty()) {
            None => Ok(None),
            Some(c) => c
                .parse::<AttemptId>()
                .map(Some)
                .map_err(|_| RpcError::InvalidRequest(format!("invalid cursor: {c}"))),
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Cursor to pass for the next page, or `None` if this is the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Cursor for the page after one ending at `last`. `None` when fewer items
/// than `page_size` came back, meaning the log is exhausted.
pub fn next_cursor(last: Option<AttemptId>, returned: usize, page_size: u32) -> Option<String> {
    if returned < page_size as usize {
        None
    } else {
        last.map(|id| id.to_string())
    }
}
