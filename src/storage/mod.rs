//! 客户端令牌存储
//! 键值存储抽象，会话管理器通过它读写持久化的令牌

pub mod file;
pub mod memory;

use crate::error::Result;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// 访问令牌的存储键
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// 刷新令牌的存储键
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// 进程内共享的键值存储
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        self.get(REFRESH_TOKEN_KEY)
    }
}
