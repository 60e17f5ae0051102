//! Ollama /api/chat 流式实现
//!
//! 响应为 NDJSON：每行一个 JSON 对象，最后一行 `done: true`。

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tracing::debug;

use super::format::build_ollama_endpoint;
use super::stream::{ensure_success, response_lines};
use super::types::{ChatChunk, ChatMessage, ChatOptions, LlmError};

/// Ollama 请求载荷
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "OllamaOptions::is_empty")]
    options: OllamaOptions,
}

#[derive(Serialize, Default)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl OllamaOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

/// Ollama 流式响应行
#[derive(Deserialize, Debug)]
struct OllamaStreamLine {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    thinking: Option<String>,
}

/// 流式调用 Ollama API
pub fn stream_ollama(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: Vec<ChatMessage>,
    model: &str,
    options: &ChatOptions,
) -> Pin<Box<dyn Stream<Item = Result<ChatChunk, LlmError>> + Send>> {
    let endpoint = build_ollama_endpoint(base_url);
    let api_key = api_key.to_string();
    let model = model.to_string();
    let options = options.clone();
    let client = client.clone();

    Box::pin(try_stream! {
        let payload = OllamaRequest {
            model: model.clone(),
            messages,
            stream: true,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let mut request = client
            .post(&endpoint)
            .header("Content-Type", "application/json");

        // 本地部署通常无需密钥，经反向代理时才需要
        if !api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        debug!("Ollama API request: endpoint={}, model={}", endpoint, model);

        let response = request
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(response, "Ollama").await?;

        let mut lines = Box::pin(response_lines(response));
        while let Some(line) = lines.next().await {
            let parsed = parse_stream_line(&line?)?;
            if let Some(chunk) = parsed.chunk {
                yield chunk;
            }
            if parsed.done {
                return;
            }
        }
    })
}

struct ParsedLine {
    chunk: Option<ChatChunk>,
    done: bool,
}

/// 解析单行 NDJSON；无法解析的行跳过，服务端报告的错误中断流
fn parse_stream_line(line: &str) -> Result<ParsedLine, LlmError> {
    let parsed = match serde_json::from_str::<OllamaStreamLine>(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Failed to parse Ollama response: {}, data: {}", e, line);
            return Ok(ParsedLine { chunk: None, done: false });
        }
    };

    if let Some(message) = parsed.error {
        return Err(LlmError::StreamError(message));
    }

    let (content, reasoning_content) = match parsed.message {
        Some(msg) => (
            Some(msg.content).filter(|c| !c.is_empty()),
            msg.thinking.filter(|t| !t.is_empty()),
        ),
        None => (None, None),
    };

    let finish_reason = if parsed.done {
        Some(parsed.done_reason.unwrap_or_else(|| "stop".to_string()))
    } else {
        None
    };

    let chunk = if content.is_some() || reasoning_content.is_some() || finish_reason.is_some() {
        Some(ChatChunk {
            content,
            finish_reason,
            reasoning_content,
        })
    } else {
        None
    };

    Ok(ParsedLine {
        chunk,
        done: parsed.done,
    })
}
