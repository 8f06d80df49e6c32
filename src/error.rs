//! 统一错误模型
//! 定义客户端所有错误类型以及面向用户的错误消息

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::request::FieldErrors;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ClientError {
    /// 后端返回非 2xx 响应
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
        /// 后端返回的字段级错误（如果有）
        details: Option<FieldErrors>,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 在会话提供范围之外访问会话
    #[error("Session is not available in this scope")]
    SessionUnavailable,

    /// 登录期间发生了登出，登录结果被丢弃
    #[error("Session changed while the request was in flight")]
    SessionSuperseded,
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// 后端 HTTP 状态码（仅 Api 错误和带状态的传输错误）
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(StatusCode::UNAUTHORIZED)
    }

    /// 字段级错误：本地校验失败或后端返回的 details
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Api { details, .. } => details.as_ref(),
            ClientError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// 获取用户友好的错误消息（不包含传输层细节）
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status, message, .. } => {
                if status.is_server_error() || message.is_empty() {
                    "The server could not process the request".to_string()
                } else {
                    message.clone()
                }
            }
            ClientError::Http(_) => "Unable to reach the server".to_string(),
            ClientError::Decode(_) => "Unexpected response from the server".to_string(),
            ClientError::Storage(_) => "Unable to access saved credentials".to_string(),
            ClientError::Validation(_) => "Please correct the highlighted fields".to_string(),
            ClientError::Config(_) => "Configuration error".to_string(),
            ClientError::SessionUnavailable => "No active session".to_string(),
            ClientError::SessionSuperseded => "Session changed, please try again".to_string(),
        }
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for ClientError {
    fn from(e: config::ConfigError) -> Self {
        ClientError::Config(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}
