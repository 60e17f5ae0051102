//! OpenAI 兼容 /v1/chat/completions 流式实现
//!
//! 响应为 SSE：`data: {...}` 行携带增量，`data: [DONE]` 结束。
//! 适用于 LM Studio、vLLM、llama.cpp server 等本地服务。

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tracing::debug;

use super::format::build_openai_endpoint;
use super::stream::{ensure_success, response_lines};
use super::types::{ChatChunk, ChatMessage, ChatOptions, LlmError};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    delta: CompletionDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct CompletionDelta {
    content: Option<String>,
    reasoning_content: Option<String>,
}

/// 单行 SSE 的解析结果
#[derive(Debug)]
enum SseEvent {
    Chunk(ChatChunk),
    Done,
    /// 注释行、事件名、空 choices 或无法解析的数据
    Skip,
}

/// 流式调用 OpenAI 兼容 API，未配置密钥时不发送 Authorization 头
pub fn stream_openai(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: Vec<ChatMessage>,
    model: &str,
    options: &ChatOptions,
) -> Pin<Box<dyn Stream<Item = Result<ChatChunk, LlmError>> + Send>> {
    let endpoint = build_openai_endpoint(base_url);
    let api_key = api_key.to_string();
    let model = model.to_string();
    let temperature = options.temperature;
    let max_tokens = options.max_tokens;
    let client = client.clone();

    Box::pin(try_stream! {
        let payload = CompletionRequest {
            model: &model,
            messages: &messages,
            stream: true,
            temperature,
            max_tokens,
        };

        let mut request = client.post(&endpoint).json(&payload);
        if !api_key.is_empty() {
            request = request.bearer_auth(&api_key);
        }

        debug!("OpenAI-compatible request: endpoint={}, model={}", endpoint, model);

        let response = ensure_success(request.send().await?, "OpenAI").await?;

        let mut lines = Box::pin(response_lines(response));
        while let Some(line) = lines.next().await {
            match parse_sse_line(&line?) {
                SseEvent::Chunk(chunk) => {
                    yield chunk;
                }
                SseEvent::Done => return,
                SseEvent::Skip => {}
            }
        }
    })
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<CompletionChunk>(data) {
        Ok(parsed) => match parsed.choices.into_iter().next() {
            Some(choice) => SseEvent::Chunk(ChatChunk {
                content: choice.delta.content,
                finish_reason: choice.finish_reason,
                reasoning_content: choice.delta.reasoning_content,
            }),
            None => SseEvent::Skip,
        },
        Err(e) => {
            debug!("Failed to parse SSE data: {}, data: {}", e, data);
            SseEvent::Skip
        }
    }
}
