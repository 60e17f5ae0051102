//! 流式响应公共处理
//!
//! Ollama 的 NDJSON 与 OpenAI 的 SSE 都是按行分隔的文本流，
//! 状态检查和按行切分在这里统一完成，各格式只负责解析单行。

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::Response;
use tracing::error;

use super::types::LlmError;
use crate::utils::RequestLogger;

/// 错误响应正文写入日志时保留的字符数
const ERROR_BODY_LOG_CHARS: usize = 500;

/// 非 2xx 响应转为 `ApiError`，完整正文保留在错误中
pub(super) async fn ensure_success(response: Response, provider: &str) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_code = status.as_u16();
    let error_text = response.text().await.unwrap_or_default();
    error!(
        "{} API error: status={}, body={}",
        provider,
        status_code,
        RequestLogger::truncate(&error_text, ERROR_BODY_LOG_CHARS)
    );

    Err(LlmError::ApiError {
        status: status_code,
        message: error_text,
    })
}

/// 把响应体转为非空文本行的流，末尾没有换行的残留行也会产出
pub(super) fn response_lines(response: Response) -> impl Stream<Item = Result<String, LlmError>> + Send {
    try_stream! {
        let mut lines = LineBuffer::default();
        let mut body = response.bytes_stream();

        while let Some(bytes) = body.next().await {
            lines.push(&bytes?);
            while let Some(line) = lines.next_line() {
                yield line;
            }
        }

        if let Some(tail) = lines.finish() {
            yield tail;
        }
    }
}

/// 按字节缓存，遇到换行才解码，避免多字节字符跨块时被拆坏
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<String> {
        loop {
            let pos = self.pending.iter().position(|&b| b == b'\n')?;
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
    }

    fn finish(self) -> Option<String> {
        let tail = String::from_utf8_lossy(&self.pending).trim().to_string();
        (!tail.is_empty()).then_some(tail)
    }
}
