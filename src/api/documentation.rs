//! 文档生成端点

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::api::{CodeRequest, DocumentationResponse, FailureResponse, RegenerateRequest};
use crate::services::code_analyzer::resolve_language;
use crate::services::doc_generator::{
    DocumentationGenerator, DocumentationRequest, GenerationFailure, GenerationMode, GenerationOutcome,
};
use crate::state::AppState;

impl IntoResponse for GenerationOutcome {
    fn into_response(self) -> Response {
        match self {
            GenerationOutcome::Success(doc) => Json(DocumentationResponse::from(doc)).into_response(),
            GenerationOutcome::Failure(failure) => {
                (StatusCode::BAD_GATEWAY, Json(FailureResponse::from(failure))).into_response()
            }
        }
    }
}

fn ensure_code(code: &str) -> AppResult<()> {
    if code.trim().is_empty() {
        return Err(AppError::BadRequest("code must not be empty".to_string()));
    }
    Ok(())
}

/// 按当前配置构建生成器；配置无效时直接得到失败结果
fn build_generator(state: &AppState, mode: GenerationMode) -> Result<DocumentationGenerator, GenerationOutcome> {
    let config = state.config.get();
    DocumentationGenerator::from_config(&config, Arc::clone(&state.request_logger))
        .map_err(|e| GenerationOutcome::Failure(GenerationFailure::from_llm_error(&e, mode)))
}

/// 生成文档
async fn generate_documentation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CodeRequest>,
) -> AppResult<GenerationOutcome> {
    ensure_code(&req.code)?;

    let generator = match build_generator(&state, GenerationMode::Generate) {
        Ok(generator) => generator,
        Err(outcome) => return Ok(outcome),
    };
    let request = DocumentationRequest {
        code: &req.code,
        language: resolve_language(req.language.as_deref(), req.filename.as_deref()),
        filename: req.filename.as_deref(),
    };

    Ok(generator.generate(&request).await)
}

/// 重新生成文档
async fn regenerate_documentation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateRequest>,
) -> AppResult<GenerationOutcome> {
    ensure_code(&req.code)?;

    let generator = match build_generator(&state, GenerationMode::Regenerate) {
        Ok(generator) => generator,
        Err(outcome) => return Ok(outcome),
    };
    let request = DocumentationRequest {
        code: &req.code,
        language: resolve_language(req.language.as_deref(), req.filename.as_deref()),
        filename: req.filename.as_deref(),
    };

    Ok(generator.regenerate(&request, req.feedback.as_deref()).await)
}

/// 创建文档生成路由
pub fn documentation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/generate-documentation", post(generate_documentation))
        .route("/api/regenerate-documentation", post(regenerate_documentation))
}
