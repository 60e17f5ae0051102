//! API 格式和 URL 构建工具

use serde::{Deserialize, Serialize};

/// API 格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    /// Ollama 原生 /api/chat
    #[default]
    Ollama,
    /// OpenAI 兼容的 Chat Completions API（LM Studio、llama.cpp server 等）
    OpenAi,
}

impl ApiFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiFormat::Ollama => "ollama",
            ApiFormat::OpenAi => "openai",
        }
    }

    /// 对应格式的请求端点
    pub fn endpoint(self, base_url: &str) -> String {
        match self {
            ApiFormat::Ollama => build_ollama_endpoint(base_url),
            ApiFormat::OpenAi => build_openai_endpoint(base_url),
        }
    }
}

/// 修复 base_url
///
/// - 移除末尾斜杠
/// - 修复双斜杠（保留协议部分）
pub fn fix_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().trim_end_matches('/').to_string();

    // 修复双斜杠（跳过协议部分）
    if let Some(pos) = url.find("://") {
        let (protocol, rest) = url.split_at(pos + 3);
        let fixed_rest = rest.replace("//", "/");
        url = format!("{}{}", protocol, fixed_rest);
    }

    url
}

/// 构建 Ollama chat 端点
pub fn build_ollama_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/api/chat") {
        url
    } else if url.ends_with("/api") {
        format!("{}/chat", url)
    } else {
        format!("{}/api/chat", url)
    }
}

/// 构建 OpenAI Chat Completions 端点
pub fn build_openai_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/chat/completions") {
        url
    } else if url.ends_with("/v1") {
        format!("{}/chat/completions", url)
    } else {
        format!("{}/v1/chat/completions", url)
    }
}
