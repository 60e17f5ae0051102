//! 配置管理端点

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::llm::{ApiFormat, ChatMessage, ChatOptions};
use crate::state::AppState;

/// 配置响应（隐藏 api_key 的实际值）
#[derive(Serialize)]
pub struct ConfigResponse {
    pub api_format: ApiFormat,
    pub base_url: String,
    /// 是否已设置 API 密钥
    pub api_key_set: bool,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub retry_once: bool,
    pub host: String,
    pub port: u16,
}

impl From<AppConfig> for ConfigResponse {
    fn from(config: AppConfig) -> Self {
        Self {
            api_format: config.api_format,
            base_url: config.base_url,
            api_key_set: !config.api_key.is_empty(),
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            request_timeout_secs: config.request_timeout_secs,
            retry_once: config.retry_once,
            host: config.host,
            port: config.port,
        }
    }
}

/// 配置更新请求，缺省字段保持不变
#[derive(Deserialize)]
pub struct ConfigUpdateRequest {
    pub api_format: Option<ApiFormat>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub retry_once: Option<bool>,
}

/// 配置更新响应
#[derive(Serialize)]
pub struct ConfigUpdateResponse {
    pub success: bool,
    pub message: String,
    pub config: ConfigResponse,
}

/// 连接测试请求，未给出的字段取当前配置
#[derive(Deserialize)]
pub struct TestConnectionRequest {
    pub api_format: Option<ApiFormat>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// 连接测试响应
#[derive(Serialize)]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: String,
    pub model: String,
}

/// 获取当前配置
async fn get_config_handler(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse::from(state.config.get()))
}

/// 更新配置
async fn update_config_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigUpdateRequest>,
) -> AppResult<Json<ConfigUpdateResponse>> {
    let updated = state.config.update(|config| {
        if let Some(api_format) = req.api_format {
            config.api_format = api_format;
        }
        if let Some(base_url) = req.base_url {
            config.base_url = base_url;
        }
        if let Some(api_key) = req.api_key {
            config.api_key = api_key;
        }
        if let Some(model) = req.model {
            config.model = model;
        }
        if let Some(temperature) = req.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = req.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(timeout) = req.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        if let Some(retry_once) = req.retry_once {
            config.retry_once = retry_once;
        }
    })?;

    info!("配置已更新: api_format={:?}, model={}", updated.api_format, updated.model);

    Ok(Json(ConfigUpdateResponse {
        success: true,
        message: "Config updated successfully".to_string(),
        config: ConfigResponse::from(updated),
    }))
}

/// 测试 LLM 连接
async fn test_connection_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestConnectionRequest>,
) -> AppResult<Json<TestConnectionResponse>> {
    let mut config = state.config.get();
    if let Some(api_format) = req.api_format {
        config.api_format = api_format;
    }
    if let Some(base_url) = req.base_url {
        config.base_url = base_url;
    }
    if let Some(api_key) = req.api_key {
        config.api_key = api_key;
    }
    if let Some(model) = req.model {
        config.model = model;
    }

    // 探测只做一次尝试
    let client = config.llm_client()?.with_retry(false);
    let options = ChatOptions {
        max_tokens: Some(10),
        timeout: Some(config.request_timeout_secs),
        ..Default::default()
    };

    let result = client
        .complete(vec![ChatMessage::user("Hi")], &config.model, options)
        .await?;

    if result.content.trim().is_empty() {
        return Err(AppError::Llm("No response from API".to_string()));
    }

    Ok(Json(TestConnectionResponse {
        success: true,
        message: "Connection successful".to_string(),
        model: config.model,
    }))
}

/// 创建配置路由
pub fn config_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/config", get(get_config_handler).put(update_config_handler))
        .route("/api/config/test", post(test_connection_handler))
}
