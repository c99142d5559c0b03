//! `POST /api/verify/code` and `POST /api/verify/image`.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use acp_types::VerificationResult;
use acp_verification::{CodeRequest, ImageRequest, ImageUpload, RequestContext};

use crate::origin::{client_origin, submitter};
use crate::{AppState, RpcError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeVerificationResponse {
    pub success: bool,
    pub result: VerificationResult,
    pub score: u8,
    pub message: &'static str,
    pub brand: String,
    pub matched_pattern: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVerificationResponse {
    pub success: bool,
    pub result: VerificationResult,
    pub score: u8,
    pub message: String,
    pub image_count: usize,
    pub code_verification: Option<VerificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

fn context(state: &AppState, headers: &HeaderMap) -> RequestContext {
    RequestContext::new(client_origin(headers), state.clock.now()).with_submitter(submitter(headers))
}

fn rejected(state: &AppState, err: RpcError) -> RpcError {
    state.counters.increment("rejected");
    err
}

pub async fn verify_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<CodeVerificationResponse>, RpcError> {
    let Json(request) = body.map_err(|e| rejected(&state, RpcError::InvalidRequest(e.body_text())))?;
    let ctx = context(&state, &headers);
    let outcome = state
        .code_engine
        .verify(&*state.store, &*state.store, &request, &ctx)
        .map_err(|e| rejected(&state, e.into()))?;
    state.counters.increment("verify_code");

    Ok(Json(CodeVerificationResponse {
        success: true,
        result: outcome.result,
        score: outcome.score,
        message: outcome.message(),
        brand: outcome.brand,
        matched_pattern: outcome.matched_pattern,
    }))
}

const TEXT_FIELDS: &[&str] = &[
    "brand",
    "batchNumber",
    "serialNumber",
    "barcode",
    "manufacturingDate",
];

async fn read_image_request(mut multipart: Multipart) -> Result<ImageRequest, RpcError> {
    let mut request = ImageRequest::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RpcError::InvalidRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
            request.images.push(ImageUpload::new(file_name, bytes.len()));
            continue;
        }
        if !TEXT_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
        let value = Some(text).filter(|t| !t.is_empty());
        match name.as_str() {
            "brand" => request.brand = value,
            "batchNumber" => request.batch_number = value,
            "serialNumber" => request.serial_number = value,
            "barcode" => request.barcode = value,
            _ => request.manufacturing_date = value,
        }
    }
    Ok(request)
}

pub async fn verify_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageVerificationResponse>, RpcError> {
    let multipart = multipart.map_err(|e| rejected(&state, RpcError::InvalidRequest(e.body_text())))?;
    let request = read_image_request(multipart)
        .await
        .map_err(|e| rejected(&state, e))?;
    let ctx = context(&state, &headers);
    let outcome = state
        .image_engine
        .verify(&*state.store, &*state.store, &request, &ctx)
        .map_err(|e| rejected(&state, e.into()))?;
    state.counters.increment("verify_image");

    Ok(Json(ImageVerificationResponse {
        success: true,
        result: outcome.result,
        score: outcome.score,
        message: outcome.message.text(),
        image_count: outcome.image_count,
        code_verification: outcome.code_verification,
        brand: outcome.brand,
    }))
}
