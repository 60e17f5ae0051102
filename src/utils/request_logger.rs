//! LLM 请求日志记录器
//!
//! 每次文档生成尝试写一行 JSONL，超过上限时只保留最新的记录。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

use crate::llm::{ChatMessage, ChatOptions, LlmError};

/// 默认保留的日志条数
const DEFAULT_MAX_ENTRIES: usize = 1000;

/// 请求日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// 第几次尝试（从 1 开始）
    pub attempt: u32,
    pub api_format: String,
    pub endpoint: String,
    /// API 密钥（脱敏）
    pub api_key_masked: String,
    pub model: String,
    pub messages_count: usize,
    pub messages_preview: Vec<MessagePreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    /// pending / success / error
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// 消息预览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePreview {
    pub role: String,
    pub content_preview: String,
}

/// 一次请求尝试的元信息
pub struct RequestInfo<'a> {
    pub request_id: &'a str,
    pub attempt: u32,
    pub api_format: &'a str,
    pub endpoint: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub options: &'a ChatOptions,
    pub timeout_secs: u64,
}

/// 请求日志记录器
pub struct RequestLogger {
    log_path: PathBuf,
    max_entries: usize,
    file: Mutex<Option<File>>,
}

impl RequestLogger {
    /// 在指定目录下创建日志记录器，默认目录为可执行文件旁的 storage/
    pub fn new(log_dir: Option<PathBuf>) -> Self {
        let log_dir = log_dir.unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("storage")
        });

        if let Err(e) = fs::create_dir_all(&log_dir) {
            warn!("无法创建日志目录 {:?}: {}", log_dir, e);
        }

        Self {
            log_path: log_dir.join("llm_requests.jsonl"),
            max_entries: DEFAULT_MAX_ENTRIES,
            file: Mutex::new(None),
        }
    }

    /// 修改保留条数上限
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// 生成 8 位请求 ID
    pub fn generate_request_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    /// API 密钥脱敏，空密钥记为空串
    pub fn mask_api_key(api_key: &str) -> String {
        let chars: Vec<char> = api_key.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }

    /// 按字符截断，避免切断多字节字符
    pub fn truncate(s: &str, max_chars: usize) -> String {
        match s.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &s[..idx]),
            None => s.to_string(),
        }
    }

    fn message_previews(messages: &[ChatMessage], max_messages: usize, max_chars: usize) -> Vec<MessagePreview> {
        messages
            .iter()
            .take(max_messages)
            .map(|m| MessagePreview {
                role: m.role.clone(),
                content_preview: Self::truncate(&m.content, max_chars),
            })
            .collect()
    }

    /// 构造待完成的日志条目
    pub fn begin(&self, info: &RequestInfo<'_>) -> LogEntry {
        LogEntry {
            request_id: info.request_id.to_string(),
            timestamp: Utc::now(),
            attempt: info.attempt,
            api_format: info.api_format.to_string(),
            endpoint: info.endpoint.to_string(),
            api_key_masked: Self::mask_api_key(info.api_key),
            model: info.model.to_string(),
            messages_count: info.messages.len(),
            messages_preview: Self::message_previews(info.messages, 3, 200),
            temperature: info.options.temperature,
            max_tokens: info.options.max_tokens,
            timeout_secs: info.timeout_secs,
            status: "pending".to_string(),
            duration_ms: None,
            response_length: None,
            chunk_count: None,
            response_preview: None,
            error_type: None,
            error_message: None,
            status_code: None,
        }
    }

    /// 记录成功
    pub fn log_success(&self, mut entry: LogEntry, start_time: Instant, response: &str, chunk_count: usize) {
        entry.status = "success".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.response_length = Some(response.chars().count());
        entry.chunk_count = Some(chunk_count);
        entry.response_preview = Some(Self::truncate(response, 300));
        self.write_entry(&entry);
    }

    /// 记录失败
    pub fn log_error(&self, mut entry: LogEntry, start_time: Instant, error: &LlmError) {
        entry.status = "error".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.error_type = Some(error.kind().to_string());
        entry.error_message = Some(Self::truncate(&error.to_string(), 500));
        entry.status_code = error.status_code();
        self.write_entry(&entry);
    }

    fn write_entry(&self, entry: &LogEntry) {
        let mut file_guard = self.file.lock();

        // 懒加载文件
        if file_guard.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.log_path) {
                Ok(f) => *file_guard = Some(f),
                Err(e) => {
                    warn!("无法打开请求日志 {:?}: {}", self.log_path, e);
                    return;
                }
            }
        }

        if let Some(file) = file_guard.as_mut() {
            if let Ok(json) = serde_json::to_string(entry) {
                let _ = writeln!(file, "{}", json);
                let _ = file.flush();
            }
        }

        self.cleanup_if_needed();
    }

    /// 超出上限时重写文件，只保留最后 max_entries 行
    fn cleanup_if_needed(&self) {
        let Ok(file) = File::open(&self.log_path) else {
            return;
        };
        let lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();

        if lines.len() > self.max_entries {
            let keep = &lines[lines.len() - self.max_entries..];
            if let Ok(mut file) = File::create(&self.log_path) {
                for line in keep {
                    let _ = writeln!(file, "{}", line);
                }
            }
        }
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(None)
    }
}
