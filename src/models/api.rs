//! REST API 请求/响应模型

use serde::{Deserialize, Serialize};

use crate::services::code_analyzer::types::{DocumentationCoverage, Language};
use crate::services::doc_generator::{FailureReason, GeneratedDocumentation, GenerationFailure};

/// 分析 / 生成请求
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// 重新生成请求
#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub code: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// 生成成功响应
#[derive(Debug, Serialize)]
pub struct DocumentationResponse {
    pub success: bool,
    pub documented_code: String,
    pub original_code: String,
    pub language: String,
    pub filename: Option<String>,
    pub statistics: DocumentationCoverage,
}

impl From<GeneratedDocumentation> for DocumentationResponse {
    fn from(doc: GeneratedDocumentation) -> Self {
        Self {
            success: true,
            documented_code: doc.documented_code,
            original_code: doc.original_code,
            language: doc.language,
            filename: doc.filename,
            statistics: doc.statistics,
        }
    }
}

/// 生成失败响应
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub reason: FailureReason,
}

impl From<GenerationFailure> for FailureResponse {
    fn from(failure: GenerationFailure) -> Self {
        Self {
            success: false,
            error: failure.error,
            message: failure.message,
            reason: failure.reason,
        }
    }
}

/// 支持的语言
#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    pub language: Language,
    pub display_name: &'static str,
    pub extensions: &'static [&'static str],
}

impl From<Language> for LanguageInfo {
    fn from(language: Language) -> Self {
        let patterns = language.patterns();
        Self {
            language,
            display_name: patterns.display_name,
            extensions: patterns.extensions,
        }
    }
}
