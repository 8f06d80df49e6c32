//! 资源申请模型：草稿、提交载荷与字段错误表

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationError};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const END_BEFORE_START_MESSAGE: &str = "End date cannot be before start date";

/// 申请类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Device,
    License,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Device => write!(f, "device"),
            RequestKind::License => write!(f, "license"),
        }
    }
}

/// 字段错误表：字段名（与后端一致）到错误消息
///
/// 每次校验或服务端拒绝时整体替换，不做跨轮合并。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 从后端的 `details` 对象构造
    ///
    /// 值可以是字符串或字符串数组，数组用 "; " 连接。
    pub fn from_details(details: &serde_json::Map<String, Value>) -> Self {
        let mut errors = Self::new();
        for (field, value) in details {
            let message = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
                Value::Null => continue,
                other => other.to_string(),
            };
            errors.insert(field.clone(), message);
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// 资源申请草稿，仅在一次表单交互期间存在
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ResourceRequestDraft {
    pub kind: RequestKind,
    pub device_type: Option<String>,
    pub software_name: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub purpose: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub business_justification: String,
    #[validate(required)]
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ResourceRequestDraft {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            device_type: None,
            software_name: None,
            purpose: String::new(),
            business_justification: String::new(),
            start_date: None,
            end_date: None,
        }
    }

    /// 完整的本地校验，返回全部字段错误
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Err(e) = self.validate() {
            for (field, field_errors) in e.field_errors() {
                if let Some(first) = field_errors.first() {
                    let message = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
                    errors.insert(wire_field_name(&field), message);
                }
            }
        }

        match self.kind {
            RequestKind::Device if is_blank(self.device_type.as_deref()) => {
                errors.insert("deviceType", REQUIRED_MESSAGE);
            }
            RequestKind::License if is_blank(self.software_name.as_deref()) => {
                errors.insert("softwareName", REQUIRED_MESSAGE);
            }
            _ => {}
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.insert("endDate", END_BEFORE_START_MESSAGE);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(REQUIRED_MESSAGE)));
    }
    Ok(())
}

/// Rust 字段名到后端字段名
fn wire_field_name(field: &str) -> String {
    match field {
        "device_type" => "deviceType".to_string(),
        "software_name" => "softwareName".to_string(),
        "business_justification" => "businessJustification".to_string(),
        "start_date" => "startDate".to_string(),
        "end_date" => "endDate".to_string(),
        other => other.to_string(),
    }
}

/// `POST /requests/` 请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,
    pub purpose: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub business_justification: String,
}

impl TryFrom<&ResourceRequestDraft> for CreateResourceRequest {
    type Error = FieldErrors;

    fn try_from(draft: &ResourceRequestDraft) -> Result<Self, Self::Error> {
        draft.check()?;

        let start_date = draft.start_date.ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.insert("startDate", REQUIRED_MESSAGE);
            errors
        })?;
        let trimmed = |v: &Option<String>| v.as_deref().map(|s| s.trim().to_string());

        Ok(Self {
            kind: draft.kind,
            device_type: match draft.kind {
                RequestKind::Device => trimmed(&draft.device_type),
                RequestKind::License => None,
            },
            software_name: match draft.kind {
                RequestKind::License => trimmed(&draft.software_name),
                RequestKind::Device => None,
            },
            purpose: draft.purpose.trim().to_string(),
            start_date,
            end_date: draft.end_date,
            business_justification: draft.business_justification.trim().to_string(),
        })
    }
}
