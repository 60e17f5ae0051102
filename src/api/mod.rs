//! API 路由模块

mod analysis;
mod config;
mod documentation;
mod health;

pub use analysis::analysis_routes;
pub use config::config_routes;
pub use documentation::documentation_routes;
pub use health::health_routes;

use axum::Router;

use crate::state::AppState;
use std::sync::Arc;

/// 创建所有 API 路由
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(analysis_routes())
        .merge(documentation_routes())
        .merge(config_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ConfigStore};
    use crate::utils::RequestLogger;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::path::Path;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(base_url: &str, log_dir: &Path) -> Arc<AppState> {
        let config = AppConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            ..AppConfig::default()
        };
        Arc::new(AppState::new(
            Arc::new(ConfigStore::in_memory(config)),
            Arc::new(RequestLogger::new(Some(log_dir.to_path_buf()))),
        ))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn ndjson_reply(content: &str) -> String {
        let first = json!({"message": {"role": "assistant", "content": content}, "done": false});
        format!("{}\n{}\n", first, r#"{"message":{"role":"assistant","content":""},"done":true}"#)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state("http://localhost:11434", dir.path()));

        let (status, body) = send(app.clone(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Code Documentation Generator API - Running");

        let (status, body) = send(app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_languages() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state("http://localhost:11434", dir.path()));

        let (status, body) = send(app, "GET", "/api/languages", None).await;
        assert_eq!(status, StatusCode::OK);
        let languages = body.as_array().unwrap();
        assert_eq!(languages.len(), 4);
        assert_eq!(languages[0]["language"], "python");
        assert_eq!(languages[0]["display_name"], "Python");
    }

    #[tokio::test]
    async fn test_analyze_code_resolves_language_from_filename() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state("http://localhost:11434", dir.path()));
        let code = "def foo():\n    pass\ndef bar():\n    \"\"\"doc\"\"\"\n    pass";

        let (status, body) = send(
            app,
            "POST",
            "/api/analyze-code",
            Some(json!({"code": code, "filename": "demo.py"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "python");
        assert_eq!(body["functions"], json!(["foo", "bar"]));
        assert_eq!(body["documented_functions"], 1);
        assert_eq!(body["documentation_percentage"], 50.0);
        assert_eq!(body["control_flow"]["has_control_flow"], false);
        assert_eq!(body["hint"], "");
    }

    #[tokio::test]
    async fn test_analyze_code_rejects_empty_code() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state("http://localhost:11434", dir.path()));

        let (status, body) = send(app, "POST", "/api/analyze-code", Some(json!({"code": "  \n"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_generate_documentation_success() {
        let server = MockServer::start().await;
        let documented = "```python\ndef foo():\n    \"\"\"Foo.\"\"\"\n    pass\n```";
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_reply(documented)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state(&server.uri(), dir.path()));

        let (status, body) = send(
            app,
            "POST",
            "/api/generate-documentation",
            Some(json!({"code": "def foo():\n    pass", "language": "python"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["documented_code"], "def foo():\n    \"\"\"Foo.\"\"\"\n    pass");
        assert_eq!(body["original_code"], "def foo():\n    pass");
        assert_eq!(body["language"], "python");
        assert_eq!(body["statistics"]["total_functions"], 1);
        assert_eq!(body["statistics"]["documented_functions"], 1);
        assert_eq!(body["statistics"]["documentation_percentage"], 100.0);

        let log = std::fs::read_to_string(dir.path().join("llm_requests.jsonl")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_documentation_failure_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state(&server.uri(), dir.path()));

        let (status, body) = send(
            app,
            "POST",
            "/api/regenerate-documentation",
            Some(json!({"code": "function a() {}", "filename": "a.js", "feedback": "shorter"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "upstream");
        assert_eq!(body["message"], "Failed to regenerate documentation.");
        assert!(body["error"].as_str().unwrap().contains("model crashed"));
    }

    #[tokio::test]
    async fn test_update_and_read_config() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state("http://localhost:11434", dir.path()));

        let (status, _) = send(
            app.clone(),
            "PUT",
            "/api/config",
            Some(json!({"temperature": 5.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app.clone(),
            "PUT",
            "/api/config",
            Some(json!({"model": "qwen2.5-coder", "api_key": "secret-key-123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["config"]["model"], "qwen2.5-coder");

        let (_, body) = send(app, "GET", "/api/config", None).await;
        assert_eq!(body["model"], "qwen2.5-coder");
        assert_eq!(body["api_key_set"], true);
        assert!(body.get("api_key").is_none());
        assert_eq!(body["api_format"], "ollama");
    }

    #[tokio::test]
    async fn test_connection_probe() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_reply("Hello!")))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = create_api_routes(test_state("http://localhost:1", dir.path()));

        let (status, body) = send(
            app,
            "POST",
            "/api/config/test",
            Some(json!({"base_url": server.uri()})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["model"], "llama3.2");
    }
}
