use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::{Action, Envelope};
use crate::{
    config::PRIVATE_KEY_NAME,
    credentials,
    error::{Error, Result},
    state::AppState,
    storage::{CONFIG_SHEET, MEDIA_SHEET, POSTS_SHEET, PostSheet, Workbook},
};

/// 请求的查询参数
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionParams {
    pub action: String,
    pub slug: Option<String>,
}

impl ActionParams {
    /// 从查询串的键值对中取参数，同名参数只取第一个，未知参数忽略
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        Self {
            action: first("action").unwrap_or_default(),
            slug: first("slug"),
        }
    }
}

/// 系统状态，只读诊断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub posts_sheet: bool,
    pub config_sheet: bool,
    pub media_sheet: bool,
    pub signing_key: bool,
    pub version: String,
}

/// 处理读操作
///
/// - `getAllPosts`：全部文章
/// - `getPostBySlug`：按 slug 查找单篇文章
/// - `authImageKit`：签发图床上传凭证
/// - `getSystemStatus`：表和私钥是否就绪
pub(super) async fn handle<W: Workbook>(
    app: &AppState<W>,
    action: Action,
    params: ActionParams,
) -> Result<Response> {
    let workbook = app.workbook();

    match action {
        Action::GetAllPosts => Ok(Envelope::success(workbook.all_posts().await?).into_response()),

        Action::GetPostBySlug => {
            let slug = params.slug.unwrap_or_default();
            Ok(Envelope::success(workbook.post_by_slug(&slug).await?).into_response())
        }

        Action::AuthImageKit => {
            let private_key = app
                .resolver()
                .get(workbook, PRIVATE_KEY_NAME)
                .await?
                .ok_or_else(|| {
                    Error::Config(format!(
                        "{PRIVATE_KEY_NAME} not configured in Script Properties"
                    ))
                })?;

            let now = chrono::Utc::now().timestamp();
            let creds = credentials::issue(&private_key, now, app.config().upload_expire_secs);
            tracing::info!(expire = creds.expire, "upload credentials issued");

            Ok(Envelope::success(creds).into_response())
        }

        Action::GetSystemStatus => {
            let status = SystemStatus {
                posts_sheet: workbook.has_sheet(POSTS_SHEET).await?,
                config_sheet: workbook.has_sheet(CONFIG_SHEET).await?,
                media_sheet: workbook.has_sheet(MEDIA_SHEET).await?,
                signing_key: app
                    .resolver()
                    .get(workbook, PRIVATE_KEY_NAME)
                    .await?
                    .is_some(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            };
            Ok(Envelope::success(status).into_response())
        }

        write => Err(Error::InvalidAction(write.name().to_string())),
    }
}
