//! 健康检查与元信息端点

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::models::api::LanguageInfo;
use crate::services::code_analyzer::types::Language;
use crate::state::AppState;
use std::sync::Arc;

/// 根路径
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Code Documentation Generator API - Running"
    }))
}

/// 健康检查处理器
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}

/// 支持的语言列表
async fn list_languages() -> Json<Vec<LanguageInfo>> {
    Json(Language::ALL.into_iter().map(LanguageInfo::from).collect())
}

/// 创建健康检查路由
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/languages", get(list_languages))
}
