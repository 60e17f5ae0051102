//! 文档生成器
//!
//! 负责构建 Prompt、调用 LLM、清理响应并统计文档覆盖率

use std::sync::Arc;
use tracing::{info, warn};

use super::prompts;
use super::types::{
    FailureReason, GeneratedDocumentation, GenerationFailure, GenerationMode, GenerationOutcome,
};
use crate::config::AppConfig;
use crate::llm::{ChatMessage, ChatOptions, LlmClient, LlmError};
use crate::services::code_analyzer::types::Language;
use crate::services::code_analyzer::{analyze_control_flow, compose_hint, score};
use crate::utils::RequestLogger;

/// 一次生成请求的输入
#[derive(Debug, Clone, Copy)]
pub struct DocumentationRequest<'a> {
    pub code: &'a str,
    pub language: Option<Language>,
    pub filename: Option<&'a str>,
}

impl DocumentationRequest<'_> {
    fn language_tag(&self) -> &'static str {
        self.language.map_or("unknown", Language::tag)
    }
}

/// 文档生成器
pub struct DocumentationGenerator {
    client: LlmClient,
    model: String,
    options: ChatOptions,
}

impl DocumentationGenerator {
    pub fn new(client: LlmClient, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client,
            model: model.into(),
            options,
        }
    }

    /// 按当前配置创建生成器，并挂载请求日志
    pub fn from_config(config: &AppConfig, logger: Arc<RequestLogger>) -> Result<Self, LlmError> {
        let client = config.llm_client()?.with_logger(logger);
        Ok(Self::new(client, &config.model, config.chat_options()))
    }

    /// 为缺少文档的函数生成文档
    pub async fn generate(&self, request: &DocumentationRequest<'_>) -> GenerationOutcome {
        let hint = control_flow_hint(request);
        let prompt = prompts::build_generation_prompt(request.code, request.language, &hint);
        self.run(request, prompt, GenerationMode::Generate).await
    }

    /// 重新生成更详细的文档
    pub async fn regenerate(&self, request: &DocumentationRequest<'_>, feedback: Option<&str>) -> GenerationOutcome {
        let hint = control_flow_hint(request);
        let prompt = prompts::build_regeneration_prompt(request.code, request.language, &hint, feedback);
        self.run(request, prompt, GenerationMode::Regenerate).await
    }

    async fn run(&self, request: &DocumentationRequest<'_>, prompt: String, mode: GenerationMode) -> GenerationOutcome {
        let tag = request.language_tag();
        let messages = vec![
            ChatMessage::system(prompts::system_prompt(request.language)),
            ChatMessage::user(prompt),
        ];

        info!(
            "开始生成文档: mode={:?}, language={}, filename={:?}, chars={}",
            mode,
            tag,
            request.filename,
            request.code.chars().count()
        );

        let collected = match self.client.complete(messages, &self.model, self.options.clone()).await {
            Ok(collected) => collected,
            Err(e) => {
                warn!("文档生成失败: mode={:?}, error={}", mode, e);
                return GenerationOutcome::Failure(GenerationFailure::from_llm_error(&e, mode));
            }
        };

        let documented_code = strip_code_fences(&collected.content);
        if documented_code.is_empty() {
            warn!("LLM 返回空内容: mode={:?}, finish_reason={:?}", mode, collected.finish_reason);
            return GenerationOutcome::Failure(GenerationFailure::new(
                FailureReason::EmptyResponse,
                "LLM returned an empty response",
                mode,
            ));
        }

        let statistics = score(request.code, &documented_code, tag);
        info!(
            "文档生成完成: documented={}/{} ({}%)",
            statistics.documented_functions, statistics.total_functions, statistics.percentage
        );

        GenerationOutcome::Success(GeneratedDocumentation {
            documented_code,
            original_code: request.code.to_string(),
            language: tag.to_string(),
            filename: request.filename.map(str::to_string),
            statistics,
        })
    }
}

fn control_flow_hint(request: &DocumentationRequest<'_>) -> String {
    compose_hint(&analyze_control_flow(request.code, request.language_tag()))
}

/// 去掉响应开头的 markdown 代码围栏
///
/// 开头不是围栏时原样返回（去除首尾空白）；缺少结束围栏时取到文本末尾。
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // 第一行是语言标记
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ApiFormat;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ndjson_reply(content: &str) -> String {
        let first = serde_json::json!({
            "message": {"role": "assistant", "content": content},
            "done": false,
        });
        format!(
            "{}\n{}\n",
            first,
            r#"{"message":{"role":"assistant","content":""},"done":true,"done_reason":"stop"}"#
        )
    }

    fn generator(server: &MockServer, timeout_secs: u64) -> DocumentationGenerator {
        let client = LlmClient::new("", server.uri(), ApiFormat::Ollama, timeout_secs).unwrap();
        DocumentationGenerator::new(client, "llama3.2", ChatOptions::default())
    }

    const PY_SOURCE: &str = "def foo():\n    pass\n\ndef bar(items):\n    for item in items:\n        print(item)\n";

    fn request() -> DocumentationRequest<'static> {
        DocumentationRequest {
            code: PY_SOURCE,
            language: Some(Language::Python),
            filename: Some("sample.py"),
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```python\ndef f():\n    pass\n```"), "def f():\n    pass");
        assert_eq!(strip_code_fences("```\nx = 1\n```\nTrailing notes"), "x = 1");
        assert_eq!(strip_code_fences("  def f(): pass  "), "def f(): pass");
        assert_eq!(strip_code_fences("```go\nfunc F() {}"), "func F() {}");
        assert_eq!(strip_code_fences("Here it is:\n```python\nx\n```"), "Here it is:\n```python\nx\n```");
        assert_eq!(strip_code_fences("```"), "");
    }

    #[tokio::test]
    async fn test_generate_success_scores_documented_code() {
        let server = MockServer::start().await;
        let documented = "```python\ndef foo():\n    \"\"\"Do nothing.\"\"\"\n    pass\n\ndef bar(items):\n    \"\"\"Print items.\"\"\"\n    for item in items:\n        print(item)\n```";
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains("DETECTED CONTROL FLOW"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_reply(documented)))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = generator(&server, 5).generate(&request()).await;

        let GenerationOutcome::Success(doc) = outcome else {
            panic!("expected success");
        };
        assert!(doc.documented_code.starts_with("def foo():"));
        assert!(!doc.documented_code.contains("```"));
        assert_eq!(doc.original_code, PY_SOURCE);
        assert_eq!(doc.language, "python");
        assert_eq!(doc.filename.as_deref(), Some("sample.py"));
        assert_eq!(doc.statistics.total_functions, 2);
        assert_eq!(doc.statistics.documented_functions, 2);
        assert_eq!(doc.statistics.percentage, 100.0);
    }

    #[tokio::test]
    async fn test_regenerate_sends_feedback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains("User feedback: explain the loop"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_reply("def foo():\n    pass")))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = generator(&server, 5)
            .regenerate(&request(), Some("explain the loop"))
            .await;

        let GenerationOutcome::Success(doc) = outcome else {
            panic!("expected success");
        };
        assert_eq!(doc.statistics.documented_functions, 0);
        assert_eq!(doc.statistics.percentage, 0.0);
    }

    #[tokio::test]
    async fn test_empty_response_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_reply("```python\n```")))
            .mount(&server)
            .await;

        let outcome = generator(&server, 5).generate(&request()).await;

        let GenerationOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.reason, FailureReason::EmptyResponse);
        assert_eq!(failure.message, GenerationMode::Generate.failure_message());
    }

    #[tokio::test]
    async fn test_upstream_error_after_retry_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2)
            .mount(&server)
            .await;

        let outcome = generator(&server, 5).regenerate(&request(), None).await;

        let GenerationOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.reason, FailureReason::Upstream);
        assert_eq!(failure.message, "Failed to regenerate documentation.");
        assert!(failure.error.contains("500"));
    }

    #[tokio::test]
    async fn test_multibyte_error_body_is_failure() {
        // 需要订阅者，error! 才会真正格式化响应正文
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let server = MockServer::start().await;
        let body = format!("a{}", "é".repeat(400));
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(400).set_body_string(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = generator(&server, 5).generate(&request()).await;

        let GenerationOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.reason, FailureReason::Upstream);
        assert!(failure.error.contains("400"));
        assert!(failure.error.ends_with(&body));
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        // 绑定后立即释放端口，保证无人监听
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = LlmClient::new("", format!("http://127.0.0.1:{}", port), ApiFormat::Ollama, 5).unwrap();
        let generator = DocumentationGenerator::new(client, "llama3.2", ChatOptions::default());

        let outcome = generator.generate(&request()).await;

        let GenerationOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.reason, FailureReason::Connection);
    }
}
