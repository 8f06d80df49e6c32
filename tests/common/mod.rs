//! 测试公共模块
//! 提供进程内模拟后端和测试辅助函数

#![allow(dead_code)]

use asset_portal::{
    api::PortalClient,
    config::ApiConfig,
    form::{Notice, Notifier},
    session::SessionManager,
    storage::{MemoryTokenStore, TokenStore},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const VALID_ACCESS_TOKEN: &str = "a";
pub const VALID_REFRESH_TOKEN: &str = "r";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-password";

/// 模拟后端状态：记录收到的请求，并允许测试预设 `/requests/` 的响应
pub struct BackendState {
    calls: Mutex<Vec<String>>,
    request_bodies: Mutex<Vec<Value>>,
    request_auth: Mutex<Vec<Option<String>>>,
    register_bodies: Mutex<Vec<Value>>,
    create_reply: Mutex<(StatusCode, Value)>,
    profile: Mutex<Value>,
}

impl BackendState {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            request_bodies: Mutex::new(Vec::new()),
            request_auth: Mutex::new(Vec::new()),
            register_bodies: Mutex::new(Vec::new()),
            create_reply: Mutex::new((
                StatusCode::CREATED,
                json!({ "id": "req-1", "status": "pending" }),
            )),
            profile: Mutex::new(admin_profile()),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

impl MockBackend {
    /// 在随机端口启动模拟后端
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::new());

        let routes = Router::new()
            .route("/auth/me/", get(current_user))
            .route("/auth/login/", post(login))
            .route("/auth/register/", post(register))
            .route("/requests/", post(create_request))
            .with_state(state.clone());
        let app = Router::new().nest("/api", routes);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        }
    }

    /// 预设 `POST /requests/` 的响应
    pub fn reply_to_requests(&self, status: StatusCode, body: Value) {
        *self.state.create_reply.lock().unwrap() = (status, body);
    }

    /// 替换 `/auth/me/` 与登录响应中的用户资料
    pub fn serve_profile(&self, profile: Value) {
        *self.state.profile.lock().unwrap() = profile;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn request_bodies(&self) -> Vec<Value> {
        self.state.request_bodies.lock().unwrap().clone()
    }

    pub fn request_auth(&self) -> Vec<Option<String>> {
        self.state.request_auth.lock().unwrap().clone()
    }

    pub fn register_bodies(&self) -> Vec<Value> {
        self.state.register_bodies.lock().unwrap().clone()
    }

    /// 基于该后端构建会话管理器
    pub fn session(&self, store: Arc<dyn TokenStore>) -> Arc<SessionManager> {
        let api = Arc::new(
            PortalClient::new(&self.api_config(), store.clone()).expect("Failed to build client"),
        );
        Arc::new(SessionManager::new(api, store))
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn admin_profile() -> Value {
    json!({
        "id": "1",
        "username": ADMIN_USERNAME,
        "email": "admin@example.com",
        "first_name": "Ada",
        "last_name": "Admin",
        "is_staff": true,
        "is_superuser": true,
        "department": "IT"
    })
}

async fn current_user(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("GET /auth/me/");

    let expected = format!("Bearer {}", VALID_ACCESS_TOKEN);
    if bearer(&headers).as_deref() == Some(expected.as_str()) {
        let profile = state.profile.lock().unwrap().clone();
        (StatusCode::OK, Json(profile))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Given token not valid for any token type" })),
        )
    }
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("POST /auth/login/");

    if body["username"] == ADMIN_USERNAME && body["password"] == ADMIN_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({
                "access": VALID_ACCESS_TOKEN,
                "refresh": VALID_REFRESH_TOKEN,
                "user": state.profile.lock().unwrap().clone()
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
    }
}

async fn register(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("POST /auth/register/");
    state.register_bodies.lock().unwrap().push(body.clone());

    if body["username"] == ADMIN_USERNAME {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Validation failed",
                "details": { "username": ["A user with that username already exists."] }
            })),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({ "id": 2, "username": body["username"] })),
    )
}

async fn create_request(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("POST /requests/");
    state.request_bodies.lock().unwrap().push(body);
    state.request_auth.lock().unwrap().push(bearer(&headers));

    let (status, reply) = state.create_reply.lock().unwrap().clone();
    (status, Json(reply))
}

/// 预置令牌的内存存储
pub fn store_with(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryTokenStore> {
    let mut entries = Vec::new();
    if let Some(token) = access {
        entries.push(("access_token", token));
    }
    if let Some(token) = refresh {
        entries.push(("refresh_token", token));
    }
    Arc::new(MemoryTokenStore::with_entries(entries))
}

/// 记录所有通知
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
