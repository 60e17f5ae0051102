//! 应用状态管理
//!
//! 定义在请求处理器之间共享的状态。

use std::sync::Arc;

use crate::config::{shared_config, ConfigStore};
use crate::utils::RequestLogger;

/// 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 当前配置
    pub config: Arc<ConfigStore>,
    /// LLM 请求日志
    pub request_logger: Arc<RequestLogger>,
}

impl AppState {
    pub fn new(config: Arc<ConfigStore>, request_logger: Arc<RequestLogger>) -> Self {
        Self {
            config,
            request_logger,
        }
    }
}

/// 使用进程级配置和默认日志目录创建共享状态
pub fn create_shared_state() -> Arc<AppState> {
    Arc::new(AppState::new(shared_config(), Arc::new(RequestLogger::default())))
}
