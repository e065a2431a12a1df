use std::io;

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::api::Envelope;

pub type Result<T> = core::result::Result<T, Error>;

/// 统一错误类型
///
/// 服务端错误在分发边界处被转换为 `status: "error"` 的信封，
/// 只有 [`Error`] 的 `Display` 文本会跨越网络。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 创建时缺少必填字段
    #[error("{0}")]
    Validation(&'static str),

    /// 按 slug 查找失败
    #[error("{0}")]
    NotFound(&'static str),

    /// 缺少签名私钥或客户端公钥等配置
    #[error("{0}")]
    Config(String),

    /// 未识别的 action
    #[error("Invalid Action: {0}")]
    InvalidAction(String),

    /// POST 请求体不是合法 JSON
    #[error("Invalid JSON payload")]
    InvalidPayload(#[source] serde_json::Error),

    /// 请求体是合法 JSON，但结构与 action 不符
    #[error("Invalid payload: {0}")]
    PayloadShape(#[source] serde_json::Error),

    /// 表不存在
    #[error("Sheet \"{0}\" not found. Please run setup() first.")]
    SheetNotFound(String),

    /// 传输失败或响应无法解析
    #[error("Network error. Check your API URL or internet connection.")]
    Network(#[source] reqwest::Error),

    /// 图床拒绝了文件
    #[error("{0}")]
    Upload(String),

    /// 后端返回了 `status: "error"`，原样保留消息
    #[error("{0}")]
    Remote(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    SettingsWrite(#[from] toml::ser::Error),

    #[error(transparent)]
    SettingsRead(#[from] toml::de::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e)
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::InvalidAction(_)
            | Error::InvalidPayload(_)
            | Error::PayloadShape(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) | Error::SheetNotFound(_) | Error::Sqlx(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 以下只在客户端产生，不会经由服务端响应返回
            Error::Network(_)
            | Error::Upload(_)
            | Error::Remote(_)
            | Error::SettingsWrite(_)
            | Error::SettingsRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match &self {
            Error::Sqlx(e) => tracing::error!(%e, "sqlx error"),
            Error::Io(e) => tracing::error!(%e, "file io error"),
            Error::SheetNotFound(name) => tracing::error!(sheet = %name, "sheet missing"),
            e => tracing::debug!(%e, "action failed"),
        }

        let envelope = Envelope::<()>::error(self.to_string());
        (self.status_code(), Json(envelope)).into_response()
    }
}
