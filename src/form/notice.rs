//! 用户通知
//! 表单只产生通知事件，具体展示（语言、样式）由调用方决定

use std::fmt;

use crate::models::RequestKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 申请已提交
    RequestSubmitted { kind: RequestKind },
    /// 提交失败且没有字段级错误
    SubmissionFailed { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RequestSubmitted { kind } => {
                write!(f, "Your {} request has been submitted", kind)
            }
            Notice::SubmissionFailed { message } => {
                write!(f, "Failed to submit request: {}", message)
            }
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
