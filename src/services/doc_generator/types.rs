//! 文档生成结果类型

use serde::{Deserialize, Serialize};

use crate::llm::LlmError;
use crate::services::code_analyzer::types::DocumentationCoverage;

/// 生成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// 为缺少文档的函数补充文档
    Generate,
    /// 重新生成更详细的一版，可附带用户反馈
    Regenerate,
}

impl GenerationMode {
    /// 失败时返回给用户的提示
    pub fn failure_message(self) -> &'static str {
        match self {
            GenerationMode::Generate => {
                "Failed to generate documentation. Check that the local LLM server (Ollama) is running."
            }
            GenerationMode::Regenerate => "Failed to regenerate documentation.",
        }
    }
}

/// 生成成功的结果
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocumentation {
    pub documented_code: String,
    pub original_code: String,
    pub language: String,
    pub filename: Option<String>,
    pub statistics: DocumentationCoverage,
}

/// 失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// 每次尝试都超时
    Timeout,
    /// 无法连接 LLM 服务
    Connection,
    /// LLM 服务返回错误状态
    Upstream,
    /// 响应流无法解析
    MalformedResponse,
    /// 清理后内容为空
    EmptyResponse,
    /// 客户端配置无效
    Configuration,
}

impl From<&LlmError> for FailureReason {
    fn from(err: &LlmError) -> Self {
        match err {
            LlmError::Timeout(_) => FailureReason::Timeout,
            LlmError::HttpError(e) if e.is_timeout() => FailureReason::Timeout,
            LlmError::HttpError(_) => FailureReason::Connection,
            LlmError::ApiError { .. } => FailureReason::Upstream,
            LlmError::StreamError(_) | LlmError::JsonError(_) => FailureReason::MalformedResponse,
            LlmError::ConfigError(_) => FailureReason::Configuration,
        }
    }
}

/// 生成失败的结果
#[derive(Debug, Clone, Serialize)]
pub struct GenerationFailure {
    pub reason: FailureReason,
    /// 技术性错误描述
    pub error: String,
    /// 面向用户的提示
    pub message: String,
}

impl GenerationFailure {
    pub fn new(reason: FailureReason, error: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            reason,
            error: error.into(),
            message: mode.failure_message().to_string(),
        }
    }

    pub fn from_llm_error(err: &LlmError, mode: GenerationMode) -> Self {
        Self::new(FailureReason::from(err), err.to_string(), mode)
    }
}

/// 一次生成调用的结果，调用方需先检查是否成功
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Success(GeneratedDocumentation),
    Failure(GenerationFailure),
}
