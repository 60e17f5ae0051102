//! 应用配置管理
//!
//! 提供配置的加载、保存、更新功能。进程级默认实例以全局单例形式存在，
//! 路由通过 `AppState` 持有它的引用。

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::llm::{ApiFormat, ChatOptions, LlmClient, LlmError, DEFAULT_TIMEOUT_SECS};

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    // 配置文件位于可执行文件同级目录
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 本地 LLM 服务的 API 格式
    #[serde(default)]
    pub api_format: ApiFormat,

    /// LLM 服务基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API 密钥，本地 Ollama 可为空
    #[serde(default)]
    pub api_key: String,

    /// 模型名称
    #[serde(default = "default_model")]
    pub model: String,

    /// 温度参数 (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 最大 token 数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// 单次尝试超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 失败后是否重试一次
    #[serde(default = "default_retry_once")]
    pub retry_once: bool,

    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_once() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_format: ApiFormat::default(),
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_once: default_retry_once(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// 校验配置取值
    pub fn validate(&self) -> Result<(), AppError> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::BadRequest("base_url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::BadRequest("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::BadRequest(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AppError::BadRequest("max_tokens must be positive".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::BadRequest("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// 按当前配置构建 LLM 客户端
    pub fn llm_client(&self) -> Result<LlmClient, LlmError> {
        Ok(LlmClient::new(
            &self.api_key,
            &self.base_url,
            self.api_format,
            self.request_timeout_secs,
        )?
        .with_retry(self.retry_once))
    }

    /// 生成请求使用的采样参数
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            timeout: Some(self.request_timeout_secs),
        }
    }
}

/// 配置存储：内存中的当前配置，加上可选的持久化文件
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<AppConfig>,
}

impl ConfigStore {
    /// 从文件加载，文件缺失或损坏时使用默认值
    pub fn load(path: PathBuf) -> Self {
        let config = load_config_from_file(&path).unwrap_or_default();
        Self {
            path: Some(path),
            current: RwLock::new(config),
        }
    }

    /// 不落盘的配置存储
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            path: None,
            current: RwLock::new(config),
        }
    }

    /// 获取当前配置（克隆）
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// 更新配置
    ///
    /// 在副本上执行修改，校验通过并保存后才替换当前配置
    pub fn update<F>(&self, updater: F) -> Result<AppConfig, AppError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut current = self.current.write();
        let mut next = current.clone();
        updater(&mut next);
        next.validate()?;
        self.save(&next)?;
        *current = next.clone();
        Ok(next)
    }

    fn save(&self, config: &AppConfig) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| AppError::Config(format!("写入配置文件失败: {}", e)))?;
        info!("配置已保存: {:?}", path);
        Ok(())
    }
}

/// 从文件加载配置
fn load_config_from_file(path: &Path) -> Option<AppConfig> {
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("配置文件解析失败，使用默认配置: {}", e);
            None
        }
    }
}

/// 全局配置单例
static CONFIG: Lazy<Arc<ConfigStore>> = Lazy::new(|| Arc::new(ConfigStore::load(get_config_path())));

/// 进程级配置存储
pub fn shared_config() -> Arc<ConfigStore> {
    Arc::clone(&CONFIG)
}
