//! 会话状态

use crate::models::UserProfile;

/// 会话状态机
///
/// `Initializing` 只在启动时出现一次，之后只在
/// `Unauthenticated` 与 `Authenticated` 之间切换。
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated(UserProfile),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self, SessionState::Initializing)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Initializing => "initializing",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated(_) => "authenticated",
        }
    }
}
