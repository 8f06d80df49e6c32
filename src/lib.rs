//! 资产管理系统客户端库
//! 会话管理与资源申请提交

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod session;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ClientError, Result};
