//! LLM 模块
//!
//! 提供统一的 LLM 客户端，支持 Ollama 原生与 OpenAI 兼容两种 API 格式。

mod client;
mod format;
mod ollama;
mod openai;
mod stream;
mod types;

pub use client::{LlmClient, DEFAULT_TIMEOUT_SECS};
pub use format::ApiFormat;
pub use types::*;
