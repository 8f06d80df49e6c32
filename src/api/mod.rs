//! 后端 API 访问层
//! 会话管理器和申请表单都只依赖 `PortalApi` trait，便于替换与测试

pub mod client;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::Result,
    models::{CreateResourceRequest, Credentials, LoginResponse, RegistrationProfile, UserProfile},
};

pub use client::PortalClient;

pub const CURRENT_USER_PATH: &str = "auth/me/";
pub const LOGIN_PATH: &str = "auth/login/";
pub const REGISTER_PATH: &str = "auth/register/";
pub const REQUESTS_PATH: &str = "requests/";

#[async_trait]
pub trait PortalApi: Send + Sync {
    /// `GET /auth/me/`
    async fn current_user(&self) -> Result<UserProfile>;

    /// `POST /auth/login/`
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;

    /// `POST /auth/register/`，返回后端原始响应
    async fn register(&self, profile: &RegistrationProfile) -> Result<Value>;

    /// `POST /requests/`，返回创建的申请
    async fn create_request(&self, request: &CreateResourceRequest) -> Result<Value>;
}
