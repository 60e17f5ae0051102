//! 代码分析端点

use axum::{routing::post, Json, Router};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::api::CodeRequest;
use crate::services::code_analyzer::types::AnalysisSummary;
use crate::services::code_analyzer::{resolve_language, CodeAnalyzer};
use crate::state::AppState;

/// 分析代码结构，不调用 LLM
async fn analyze_code(Json(req): Json<CodeRequest>) -> AppResult<Json<AnalysisSummary>> {
    if req.code.trim().is_empty() {
        return Err(AppError::BadRequest("code must not be empty".to_string()));
    }

    let language = resolve_language(req.language.as_deref(), req.filename.as_deref());
    debug!("analyze-code: language={:?}, filename={:?}", language, req.filename);

    Ok(Json(CodeAnalyzer::new(&req.code, language).summarize()))
}

/// 创建分析路由
pub fn analysis_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/analyze-code", post(analyze_code))
}
