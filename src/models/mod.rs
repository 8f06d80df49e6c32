//! 数据模型模块
//! 用户资料、认证载荷与资源申请

pub mod auth;
pub mod request;
pub mod user;

pub use auth::{Credentials, LoginResponse, RegistrationProfile};
pub use request::{CreateResourceRequest, FieldErrors, RequestKind, ResourceRequestDraft};
pub use user::UserProfile;
