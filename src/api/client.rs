//! 基于 reqwest 的 API 客户端
//! 自动从令牌存储中读取访问令牌并附加到请求头

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::{PortalApi, CURRENT_USER_PATH, LOGIN_PATH, REGISTER_PATH, REQUESTS_PATH};
use crate::{
    config::ApiConfig,
    error::{ClientError, Result},
    models::{
        auth::RegisterRequest, CreateResourceRequest, Credentials, FieldErrors, LoginResponse,
        RegistrationProfile, UserProfile,
    },
    storage::TokenStore,
};

/// 资产管理后端客户端
pub struct PortalClient {
    client: Client,
    base_url: Url,
    store: Arc<dyn TokenStore>,
}

impl PortalClient {
    /// 创建新的客户端
    pub fn new(config: &ApiConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("asset-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url)?,
            store,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// 附加 Bearer 令牌（如果已持久化）
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.store.access_token()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn current_user(&self) -> Result<UserProfile> {
        let url = self.endpoint(CURRENT_USER_PATH)?;
        debug!(%url, "Fetching current user");

        let response = self.authorized(self.client.get(url))?.send().await?;
        handle_response(response).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let url = self.endpoint(LOGIN_PATH)?;
        debug!(%url, username = %credentials.username, "Sending login request");

        let response = self
            .client
            .post(url)
            .json(&credentials.as_request())
            .send()
            .await?;
        handle_response(response).await
    }

    async fn register(&self, profile: &RegistrationProfile) -> Result<Value> {
        let url = self.endpoint(REGISTER_PATH)?;
        debug!(%url, username = %profile.username, "Sending registration request");

        let response = self
            .client
            .post(url)
            .json(&RegisterRequest::from(profile))
            .send()
            .await?;
        handle_response(response).await
    }

    async fn create_request(&self, request: &CreateResourceRequest) -> Result<Value> {
        let url = self.endpoint(REQUESTS_PATH)?;
        debug!(%url, kind = %request.kind, "Submitting resource request");

        let response = self
            .authorized(self.client.post(url))?
            .json(request)
            .send()
            .await?;
        handle_response(response).await
    }
}

/// 确保根地址以 "/" 结尾，否则 `Url::join` 会替换最后一段路径
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| ClientError::Config(format!("Invalid base URL {}: {}", raw, e)))
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        return Ok(serde_json::from_str(&body)?);
    }

    let error = parse_error_body(status, &body);
    warn!(status = status.as_u16(), error = %error, "Request rejected by backend");
    Err(error)
}

/// 解析后端错误响应
///
/// 支持 `{"error": "..."}`、`{"error": {"message": "..."}}`、`{"message": "..."}`、
/// `{"detail": "..."}`，以及可选的 `details` 字段错误对象。
fn parse_error_body(status: StatusCode, body: &str) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.as_str().or_else(|| e.get("message").and_then(Value::as_str)))
                .or_else(|| v.get("message").and_then(Value::as_str))
                .or_else(|| v.get("detail").and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    let details = parsed
        .as_ref()
        .and_then(|v| v.get("details"))
        .and_then(Value::as_object)
        .map(FieldErrors::from_details)
        .filter(|errors| !errors.is_empty());

    ClientError::Api {
        status,
        message,
        details,
    }
}
