//! 统一 LLM 客户端

use futures::{Stream, StreamExt};
use reqwest::Client;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::format::ApiFormat;
use super::ollama::stream_ollama;
use super::openai::stream_openai;
use super::types::{ChatChunk, ChatMessage, ChatOptions, LlmError, StreamCollectResult};
use crate::utils::request_logger::{RequestInfo, RequestLogger};

/// 默认单次尝试超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// 统一 LLM 客户端
///
/// 按配置的 API 格式调用本地 Ollama 或 OpenAI 兼容服务。
/// `complete` 对每次尝试施加超时，可重试的失败最多再试一次。
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    api_format: ApiFormat,
    timeout_secs: u64,
    max_attempts: u32,
    logger: Option<Arc<RequestLogger>>,
}

impl LlmClient {
    /// 创建新的 LLM 客户端，本地服务允许空密钥
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        api_format: ApiFormat,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(LlmError::ConfigError("Base URL is required".to_string()));
        }

        // 整体超时由 complete 按尝试控制，这里只限制建连
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
            api_format,
            timeout_secs: timeout_secs.max(1),
            max_attempts: 2,
            logger: None,
        })
    }

    /// 是否在首次失败后重试一次
    pub fn with_retry(mut self, retry_once: bool) -> Self {
        self.max_attempts = if retry_once { 2 } else { 1 };
        self
    }

    /// 挂载请求日志记录器
    pub fn with_logger(mut self, logger: Arc<RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// 流式聊天，按配置的 API 格式分发
    pub fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        options: ChatOptions,
    ) -> Pin<Box<dyn Stream<Item = Result<ChatChunk, LlmError>> + Send>> {
        info!("LLM request: model={}, api_format={:?}", model, self.api_format);

        match self.api_format {
            ApiFormat::Ollama => stream_ollama(
                &self.client,
                &self.api_key,
                &self.base_url,
                messages,
                model,
                &options,
            ),
            ApiFormat::OpenAi => stream_openai(
                &self.client,
                &self.api_key,
                &self.base_url,
                messages,
                model,
                &options,
            ),
        }
    }

    /// 流式请求并收集完整响应
    pub async fn stream_and_collect(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        options: ChatOptions,
    ) -> Result<StreamCollectResult, LlmError> {
        let mut stream = self.stream_chat(messages, model, options);
        let mut result = StreamCollectResult::default();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            result.chunk_count += 1;

            if let Some(content) = chunk.content {
                result.content.push_str(&content);
            }

            if let Some(reasoning) = chunk.reasoning_content {
                result.reasoning.push_str(&reasoning);
            }

            if chunk.finish_reason.is_some() {
                result.finish_reason = chunk.finish_reason;
            }
        }

        Ok(result)
    }

    /// 带超时与单次重试的完整请求
    ///
    /// 每次尝试独立计时；超时、连接错误、流中断和 5xx 视为可重试。
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        options: ChatOptions,
    ) -> Result<StreamCollectResult, LlmError> {
        let timeout_secs = options.timeout.unwrap_or(self.timeout_secs).max(1);
        let request_id = RequestLogger::generate_request_id();
        let endpoint = self.api_format.endpoint(&self.base_url);
        let mut attempt = 1;

        loop {
            let start_time = Instant::now();
            let entry = self.logger.as_ref().map(|logger| {
                logger.begin(&RequestInfo {
                    request_id: &request_id,
                    attempt,
                    api_format: self.api_format.as_str(),
                    endpoint: &endpoint,
                    api_key: &self.api_key,
                    model,
                    messages: &messages,
                    options: &options,
                    timeout_secs,
                })
            });

            let collect = self.stream_and_collect(messages.clone(), model, options.clone());
            let result = match tokio::time::timeout(Duration::from_secs(timeout_secs), collect).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(timeout_secs)),
            };

            if let (Some(logger), Some(entry)) = (self.logger.as_ref(), entry) {
                match &result {
                    Ok(collected) => logger.log_success(entry, start_time, &collected.content, collected.chunk_count),
                    Err(e) => logger.log_error(entry, start_time, e),
                }
            }

            match result {
                Ok(collected) => {
                    info!(
                        "[{}] LLM 响应完成: attempt={}, chars={}, reasoning_chars={}, elapsed={}ms",
                        request_id,
                        attempt,
                        collected.content.chars().count(),
                        collected.reasoning.chars().count(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(collected);
                }
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    warn!("[{}] LLM 请求失败，准备重试: attempt={}, error={}", request_id, attempt, e);
                    attempt += 1;
                }
                Err(e) => {
                    warn!("[{}] LLM 请求失败: attempt={}, error={}", request_id, attempt, e);
                    return Err(e);
                }
            }
        }
    }
}
