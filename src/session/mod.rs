//! 会话管理
//! 登录状态的唯一来源：启动时恢复、登录、登出、注册

mod manager;
mod provider;
mod state;

pub use manager::SessionManager;
pub use provider::SessionProvider;
pub use state::SessionState;
