//! Unauthenticated read endpoints: health and the brand catalogue.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use acp_types::Brand;
use acp_utils::format_duration;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime: String,
    pub uptime_secs: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let secs = state.started_at.elapsed_since(state.clock.now());
    Json(HealthResponse {
        status: "ok",
        uptime: format_duration(secs),
        uptime_secs: secs,
    })
}

#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub success: bool,
    pub brands: Vec<Brand>,
}

/// All brands sorted by name. Store failures produce an empty list so
/// catalogue pages still render.
pub async fn list_brands(State(state): State<AppState>) -> Json<BrandsResponse> {
    let brands = match state.store.iter_brands() {
        Ok(mut brands) => {
            brands.sort_by(|a, b| a.name.cmp(&b.name));
            brands
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to list brands");
            Vec::new()
        }
    };
    Json(BrandsResponse {
        success: true,
        brands,
    })
}
