//! 资源申请表单

mod notice;
mod request_form;
mod scope;

pub use notice::{Notice, Notifier};
pub use request_form::{CompletionCallback, RequestForm, SubmitOutcome};

pub(crate) use scope::{InFlight, ScopeToken};
