//! 资源申请表单
//! 本地校验、提交以及服务端字段错误回显

use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::{InFlight, Notice, Notifier, ScopeToken};
use crate::{
    api::PortalApi,
    error::{ClientError, Result},
    models::{CreateResourceRequest, FieldErrors, RequestKind, ResourceRequestDraft},
    session::SessionProvider,
};

/// 提交成功后的回调，参数为后端返回的申请
pub type CompletionCallback = Box<dyn Fn(&Value) + Send + Sync>;

/// 一次提交的结果
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 已提交，草稿已清空
    Submitted(Value),
    /// 本地校验失败，未发起请求
    Invalid(FieldErrors),
    /// 服务端返回字段级错误
    Rejected(FieldErrors),
    /// 没有字段级信息的失败，草稿保留以便重试
    Failed(ClientError),
    /// 已有提交在进行中
    Busy,
    /// 表单已关闭，结果被丢弃
    Discarded,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

struct FormState {
    draft: ResourceRequestDraft,
    errors: FieldErrors,
}

pub struct RequestForm {
    kind: RequestKind,
    api: Arc<dyn PortalApi>,
    notifier: Arc<dyn Notifier>,
    on_complete: Option<CompletionCallback>,
    state: Mutex<FormState>,
    submitting: AtomicBool,
    scope: ScopeToken,
}

impl RequestForm {
    /// 打开一个新表单
    ///
    /// 会话未提供时立即返回 `SessionUnavailable`。
    pub fn open(
        provider: &SessionProvider,
        kind: RequestKind,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = provider.session()?;
        debug!(%kind, "Opening request form");

        Ok(Self {
            kind,
            api: session.api(),
            notifier,
            on_complete: None,
            state: Mutex::new(FormState {
                draft: ResourceRequestDraft::new(kind),
                errors: FieldErrors::new(),
            }),
            submitting: AtomicBool::new(false),
            scope: ScopeToken::new(),
        })
    }

    pub fn on_complete(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn draft(&self) -> ResourceRequestDraft {
        self.lock().draft.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().errors.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_closed()
    }

    /// 修改草稿；申请类型在表单生命周期内固定
    pub fn update(&self, edit: impl FnOnce(&mut ResourceRequestDraft)) {
        let mut state = self.lock();
        edit(&mut state.draft);
        state.draft.kind = self.kind;
    }

    /// 执行一次本地校验，整体替换字段错误表
    pub fn validate(&self) -> bool {
        let mut state = self.lock();
        match state.draft.check() {
            Ok(()) => {
                state.errors = FieldErrors::new();
                true
            }
            Err(errors) => {
                state.errors = errors;
                false
            }
        }
    }

    /// 提交草稿
    pub async fn submit(&self) -> SubmitOutcome {
        if self.scope.is_closed() {
            return SubmitOutcome::Discarded;
        }

        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            debug!(kind = %self.kind, "Submit ignored, request already in flight");
            return SubmitOutcome::Busy;
        };

        let payload = {
            let mut state = self.lock();
            match CreateResourceRequest::try_from(&state.draft) {
                Ok(payload) => {
                    state.errors = FieldErrors::new();
                    payload
                }
                Err(errors) => {
                    debug!(kind = %self.kind, fields = errors.len(), "Draft failed validation");
                    state.errors = errors.clone();
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        let result = self.api.create_request(&payload).await;

        if self.scope.is_closed() {
            debug!(kind = %self.kind, "Form closed before response arrived, dropping result");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(created) => {
                info!(kind = %self.kind, "Resource request submitted");
                {
                    let mut state = self.lock();
                    state.draft = ResourceRequestDraft::new(self.kind);
                    state.errors = FieldErrors::new();
                }
                self.notifier
                    .notify(Notice::RequestSubmitted { kind: self.kind });
                if let Some(callback) = &self.on_complete {
                    callback(&created);
                }
                SubmitOutcome::Submitted(created)
            }
            Err(ClientError::Api {
                details: Some(details),
                status,
                ..
            }) => {
                warn!(kind = %self.kind, status = status.as_u16(), fields = details.len(), "Request rejected with field errors");
                self.lock().errors = details.clone();
                SubmitOutcome::Rejected(details)
            }
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "Resource request failed");
                self.notifier.notify(Notice::SubmissionFailed {
                    message: e.user_message(),
                });
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// 取消：丢弃草稿与错误并关闭表单
    pub fn cancel(&self) {
        self.scope.close();
        let mut state = self.lock();
        state.draft = ResourceRequestDraft::new(self.kind);
        state.errors = FieldErrors::new();
        debug!(kind = %self.kind, "Request form cancelled");
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
