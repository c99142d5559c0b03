//! `/api/admin/*`: brand and pattern maintenance, the verification history
//! and statistics.
//!
//! All routes sit behind [`crate::auth::require_admin`].

use std::collections::{BTreeMap, HashMap};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use acp_types::{
    AttemptId, Brand, BrandDraft, BrandId, CodePattern, CodePatternDraft, FakePattern,
    FakePatternDraft, PatternId, VerificationAttempt,
};

use crate::pagination::{next_cursor, PaginationMeta, PaginationParams};
use crate::{AppState, RpcError};

fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    body.map(|Json(v)| v)
        .map_err(|e| RpcError::InvalidRequest(e.body_text()))
}

#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub success: bool,
    pub brands: Vec<Brand>,
}

#[derive(Debug, Serialize)]
pub struct BrandResponse {
    pub success: bool,
    pub brand: Brand,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub success: bool,
    /// Patterns removed together with a brand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_patterns: Option<usize>,
}

pub async fn list_brands(State(state): State<AppState>) -> Result<Json<BrandsResponse>, RpcError> {
    let mut brands = state.store.iter_brands()?;
    brands.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(BrandsResponse {
        success: true,
        brands,
    }))
}

pub async fn create_brand(
    State(state): State<AppState>,
    draft: Result<Json<BrandDraft>, JsonRejection>,
) -> Result<Json<BrandResponse>, RpcError> {
    let draft = body(draft)?;
    draft.validate()?;
    let brand = state.store.insert_brand(draft, state.clock.now())?;
    tracing::info!(brand = %brand.name, id = %brand.id, "created brand");
    Ok(Json(BrandResponse {
        success: true,
        brand,
    }))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
    draft: Result<Json<BrandDraft>, JsonRejection>,
) -> Result<Json<BrandResponse>, RpcError> {
    let draft = body(draft)?;
    draft.validate()?;
    let brand = state.store.update_brand(id, draft)?;
    Ok(Json(BrandResponse {
        success: true,
        brand,
    }))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<Json<DeletedResponse>, RpcError> {
    let removed = state.store.delete_brand(id)?;
    Ok(Json(DeletedResponse {
        success: true,
        removed_patterns: Some(removed),
    }))
}

/// A genuine pattern with its brand's name resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePatternView {
    #[serde(flatten)]
    pub pattern: CodePattern,
    pub brand_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CodePatternsResponse {
    pub success: bool,
    pub patterns: Vec<CodePatternView>,
}

#[derive(Debug, Serialize)]
pub struct CodePatternResponse {
    pub success: bool,
    pub pattern: CodePattern,
}

fn brand_names(state: &AppState) -> Result<HashMap<BrandId, String>, RpcError> {
    Ok(state
        .store
        .iter_brands()?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect())
}

pub async fn list_code_patterns(
    State(state): State<AppState>,
) -> Result<Json<CodePatternsResponse>, RpcError> {
    let names = brand_names(&state)?;
    let patterns = state
        .store
        .iter_code_patterns()?
        .into_iter()
        .map(|pattern| CodePatternView {
            brand_name: names.get(&pattern.brand_id).cloned(),
            pattern,
        })
        .collect();
    Ok(Json(CodePatternsResponse {
        success: true,
        patterns,
    }))
}

pub async fn create_code_pattern(
    State(state): State<AppState>,
    draft: Result<Json<CodePatternDraft>, JsonRejection>,
) -> Result<Json<CodePatternResponse>, RpcError> {
    let draft = body(draft)?;
    draft.validate()?;
    let pattern = state.store.insert_code_pattern(draft)?;
    Ok(Json(CodePatternResponse {
        success: true,
        pattern,
    }))
}

pub async fn delete_code_pattern(
    State(state): State<AppState>,
    Path(id): Path<PatternId>,
) -> Result<Json<DeletedResponse>, RpcError> {
    state.store.delete_code_pattern(id)?;
    Ok(Json(DeletedResponse {
        success: true,
        removed_patterns: None,
    }))
}

#[derive(Debug, Serialize)]
pub struct FakePatternsResponse {
    pub success: bool,
    pub patterns: Vec<FakePattern>,
}

#[derive(Debug, Serialize)]
pub struct FakePatternResponse {
    pub success: bool,
    pub pattern: FakePattern,
}

pub async fn list_fake_patterns(
    State(state): State<AppState>,
) -> Result<Json<FakePatternsResponse>, RpcError> {
    Ok(Json(FakePatternsResponse {
        success: true,
        patterns: state.store.iter_fake_patterns()?,
    }))
}

pub async fn create_fake_pattern(
    State(state): State<AppState>,
    draft: Result<Json<FakePatternDraft>, JsonRejection>,
) -> Result<Json<FakePatternResponse>, RpcError> {
    let draft = body(draft)?;
    draft.validate()?;
    let pattern = state.store.insert_fake_pattern(draft)?;
    Ok(Json(FakePatternResponse {
        success: true,
        pattern,
    }))
}

pub async fn delete_fake_pattern(
    State(state): State<AppState>,
    Path(id): Path<PatternId>,
) -> Result<Json<DeletedResponse>, RpcError> {
    state.store.delete_fake_pattern(id)?;
    Ok(Json(DeletedResponse {
        success: true,
        removed_patterns: None,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub total_verifications: u64,
    pub brand_count: u64,
    /// Attempts classified as fake.
    pub system_alerts: u64,
    pub pending_verifications: u64,
    pub request_counters: BTreeMap<&'static str, u64>,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, RpcError> {
    let log = state.store.attempt_stats()?;
    Ok(Json(StatsResponse {
        success: true,
        total_verifications: log.total,
        brand_count: state.store.brand_count()?,
        system_alerts: log.fake,
        pending_verifications: log.pending,
        request_counters: state.counters.snapshot(),
    }))
}

/// A log entry with its id. Carries the submitter's origin and identity.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: AttemptId,
    #[serde(flatten)]
    pub attempt: VerificationAttempt,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub attempts: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub page: PaginationMeta,
}

pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<HistoryResponse>, RpcError> {
    let count = params.effective_count();
    let page = state
        .store
        .iter_attempts_desc(params.before()?, count as usize)?;
    state.counters.increment("history");

    let cursor = next_cursor(page.last().map(|(id, _)| *id), page.len(), count);
    Ok(Json(HistoryResponse {
        success: true,
        attempts: page
            .into_iter()
            .map(|(id, attempt)| HistoryEntry { id, attempt })
            .collect(),
        page: PaginationMeta { cursor },
    }))
}
