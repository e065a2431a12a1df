use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 信封状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// 所有响应统一使用的信封
///
/// `data` 只在成功且 action 有返回值时出现，`message` 在失败时出现，
/// 成功时可选。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
        }
    }

    /// 成功但没有数据，只带一条提示
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// 取出数据
    ///
    /// 失败或缺少数据时返回 [`Error::Remote`]，消息缺省时使用 `fallback`。
    pub fn into_data(self, fallback: &str) -> Result<T> {
        match (self.status, self.data) {
            (Status::Success, Some(data)) => Ok(data),
            _ => Err(Error::Remote(
                self.message.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }

    /// 只关心成败，成功时返回可选的提示
    pub fn into_message(self, fallback: &str) -> Result<Option<String>> {
        match self.status {
            Status::Success => Ok(self.message),
            Status::Error => Err(Error::Remote(
                self.message.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_fields() {
        let json = serde_json::to_value(Envelope::<()>::done("Post deleted")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "Post deleted"})
        );

        let json = serde_json::to_value(Envelope::success(vec![1])).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": [1]}));
    }

    #[test]
    fn test_success_without_data_is_not_data() {
        let envelope: Envelope<Vec<i32>> =
            serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(envelope.is_success());
        assert!(matches!(
            envelope.into_data("Failed to fetch posts"),
            Err(Error::Remote(m)) if m == "Failed to fetch posts"
        ));
    }

    #[test]
    fn test_error_keeps_remote_message() {
        let envelope: Envelope<()> =
            serde_json::from_str(r#"{"status":"error","message":"Post not found"}"#).unwrap();
        assert!(matches!(
            envelope.into_message("Error deleting"),
            Err(Error::Remote(m)) if m == "Post not found"
        ));
    }
}
