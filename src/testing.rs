//! 单元测试用的 API 替身

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::{
    api::PortalApi,
    error::{ClientError, Result},
    models::{
        CreateResourceRequest, Credentials, FieldErrors, LoginResponse, RegistrationProfile,
        UserProfile,
    },
};

type Reply<T> = std::result::Result<T, (u16, Value)>;

pub(crate) fn user(id: &str, username: &str) -> UserProfile {
    serde_json::from_value(json!({ "id": id, "username": username })).unwrap()
}

pub(crate) fn api_error(status: u16, body: &Value) -> ClientError {
    ClientError::Api {
        status: StatusCode::from_u16(status).unwrap(),
        message: body["error"].as_str().unwrap_or("Request failed").to_string(),
        details: body
            .get("details")
            .and_then(Value::as_object)
            .map(FieldErrors::from_details),
    }
}

/// 记录调用并返回预设响应
pub(crate) struct MockApi {
    me: Mutex<Reply<UserProfile>>,
    login: Mutex<Reply<LoginResponse>>,
    register: Mutex<Reply<Value>>,
    create: Mutex<Reply<Value>>,
    calls: Mutex<Vec<&'static str>>,
    submitted: Mutex<Vec<Value>>,
    /// 设置后，login / create_request 会等待放行
    pub gate: Option<Arc<Notify>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            me: Mutex::new(Err((401, json!({ "error": "Authentication failed" })))),
            login: Mutex::new(Err((401, json!({ "error": "Invalid credentials" })))),
            register: Mutex::new(Ok(json!({ "id": "2" }))),
            create: Mutex::new(Ok(json!({ "id": "req-1", "status": "pending" }))),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_me(self, reply: Reply<UserProfile>) -> Self {
        *self.me.lock().unwrap() = reply;
        self
    }

    pub fn with_login(self, reply: Reply<LoginResponse>) -> Self {
        *self.login.lock().unwrap() = reply;
        self
    }

    pub fn with_register(self, reply: Reply<Value>) -> Self {
        *self.register.lock().unwrap() = reply;
        self
    }

    pub fn with_create(self, reply: Reply<Value>) -> Self {
        *self.create.lock().unwrap() = reply;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<Value> {
        self.submitted.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

fn reply<T: Clone>(slot: &Mutex<Reply<T>>) -> Result<T> {
    slot.lock()
        .unwrap()
        .clone()
        .map_err(|(status, body)| api_error(status, &body))
}

#[async_trait]
impl PortalApi for MockApi {
    async fn current_user(&self) -> Result<UserProfile> {
        self.record("me");
        reply(&self.me)
    }

    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse> {
        self.record("login");
        self.wait_gate().await;
        reply(&self.login)
    }

    async fn register(&self, _profile: &RegistrationProfile) -> Result<Value> {
        self.record("register");
        reply(&self.register)
    }

    async fn create_request(&self, request: &CreateResourceRequest) -> Result<Value> {
        self.record("create_request");
        self.submitted
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        self.wait_gate().await;
        reply(&self.create)
    }
}
