//! 会话管理器

use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::SessionState;
use crate::{
    api::PortalApi,
    error::{ClientError, Result},
    models::{Credentials, RegistrationProfile, UserProfile},
    storage::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
};

/// 当前登录用户的唯一来源
///
/// 每个应用只构造一个实例，通过 `Arc` 注入到需要它的组件。
/// 异步变更（初始化、登录）串行执行；登出是同步的，会使进行中的登录结果作废。
/// 令牌写入和状态切换都在 `commit` 锁内完成，登出不会与之交错。
pub struct SessionManager {
    api: Arc<dyn PortalApi>,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
    mutation: Mutex<()>,
    /// 提交锁，只在同步代码中持有，不跨越 await
    commit: std::sync::Mutex<()>,
    /// 每次登出递增
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(api: Arc<dyn PortalApi>, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            api,
            store,
            state,
            initialized: AtomicBool::new(false),
            mutation: Mutex::new(()),
            commit: std::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> Arc<dyn PortalApi> {
        self.api.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// 启动时恢复会话，每个实例最多执行一次
    ///
    /// 有持久化令牌时请求当前用户资料；任何失败都会清除令牌并进入未登录状态。
    pub async fn initialize(&self) -> SessionState {
        let _guard = self.mutation.lock().await;

        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!(state = self.state().as_str(), "Session already initialized");
            return self.state();
        }

        let generation = self.generation.load(Ordering::SeqCst);

        let token = match self.store.access_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted access token");
                None
            }
        };

        if token.is_none() {
            info!("No persisted session");
            self.transition(SessionState::Unauthenticated);
            return self.state();
        }

        let result = self.api.current_user().await;

        let _commit = self.lock_commit();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Logged out during initialization, dropping profile result");
            return self.state();
        }

        match result {
            Ok(user) => {
                info!(user_id = ?user.id, username = %user.username, "Session restored");
                self.transition(SessionState::Authenticated(user));
            }
            Err(e) => {
                warn!(error = %e, "Persisted session rejected, clearing tokens");
                self.clear_tokens();
                self.transition(SessionState::Unauthenticated);
            }
        }

        self.state()
    }

    /// 登录
    ///
    /// 失败时状态不变，错误原样返回给调用方。
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile> {
        let _guard = self.mutation.lock().await;
        let generation = self.generation.load(Ordering::SeqCst);

        let response = self.api.login(credentials).await.map_err(|e| {
            warn!(username = %credentials.username, error = %e, "Login failed");
            e
        })?;

        let _commit = self.lock_commit();
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(username = %credentials.username, "Logout happened during login, discarding result");
            return Err(ClientError::SessionSuperseded);
        }

        self.persist_tokens(&response.access, &response.refresh)?;
        self.initialized.store(true, Ordering::SeqCst);

        let user = response.user;
        info!(user_id = ?user.id, username = %user.username, "Logged in");
        self.transition(SessionState::Authenticated(user.clone()));

        Ok(user)
    }

    /// 登出：清除令牌和用户，不访问后端
    pub fn logout(&self) {
        let _commit = self.lock_commit();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.clear_tokens();
        self.transition(SessionState::Unauthenticated);
        info!("Logged out");
    }

    /// 注册新用户，返回后端原始响应
    ///
    /// 注册不会自动登录，也不改变会话状态。
    pub async fn register(&self, profile: &RegistrationProfile) -> Result<Value> {
        let created = self.api.register(profile).await?;
        info!(username = %profile.username, "Registration accepted");
        Ok(created)
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, next: SessionState) {
        let label = next.as_str();
        let previous = self.state.send_replace(next);
        debug!(from = previous.as_str(), to = label, "Session state changed");
    }

    /// 同时写入两个令牌；任一失败则恢复原值
    fn persist_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        let previous_access = self.store.get(ACCESS_TOKEN_KEY)?;
        let previous_refresh = self.store.get(REFRESH_TOKEN_KEY)?;

        let result = self
            .store
            .set(ACCESS_TOKEN_KEY, access)
            .and_then(|_| self.store.set(REFRESH_TOKEN_KEY, refresh));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist tokens, restoring previous values");
            self.restore(ACCESS_TOKEN_KEY, previous_access.as_deref());
            self.restore(REFRESH_TOKEN_KEY, previous_refresh.as_deref());
            return Err(e);
        }

        Ok(())
    }

    fn restore(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(v) => self.store.set(key, v),
            None => self.store.remove(key),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to restore token");
        }
    }

    fn clear_tokens(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to clear token");
            }
        }
    }
}
