//! 会话提供者
//! 依赖会话的组件在构造时通过这里获取会话，缺失时立即失败

use std::sync::Arc;

use super::SessionManager;
use crate::error::{ClientError, Result};

#[derive(Clone, Default)]
pub struct SessionProvider {
    session: Option<Arc<SessionManager>>,
}

impl SessionProvider {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// 没有提供会话的作用域
    pub fn unprovided() -> Self {
        Self::default()
    }

    /// 获取会话；作用域内未提供时返回 `SessionUnavailable`
    pub fn session(&self) -> Result<Arc<SessionManager>> {
        self.session.clone().ok_or(ClientError::SessionUnavailable)
    }
}
