use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use super::{Action, Envelope};
use crate::{
    content::{MediaPayload, PostPayload, SlugPayload},
    error::{Error, Result},
    state::AppState,
    storage::{PostSheet, Workbook},
};

fn parse<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T> {
    serde_json::from_value(payload).map_err(Error::PayloadShape)
}

fn done(message: &str) -> Response {
    Envelope::<()>::done(message).into_response()
}

/// 处理写操作
///
/// - `createPost`：追加文章
/// - `updatePost`：按 `slug`，其次 `oldSlug` 定位并整行覆盖
/// - `deletePost`：按 `slug` 删除
/// - `logMedia`：记录一次上传
pub(super) async fn handle<W: Workbook>(
    app: &AppState<W>,
    action: Action,
    payload: serde_json::Value,
) -> Result<Response> {
    let workbook = app.workbook();

    match action {
        Action::CreatePost => {
            let post = workbook.create_post(parse(payload)?).await?;
            tracing::info!(slug = %post.slug, "post created");
            Ok(done("Post created"))
        }

        Action::UpdatePost => {
            let payload: PostPayload = parse(payload)?;
            let old_slug = payload.old_slug.clone();
            let post = workbook.update_post(payload).await?;
            tracing::info!(slug = %post.slug, old_slug = ?old_slug, "post updated");
            Ok(done("Post updated"))
        }

        Action::DeletePost => {
            let SlugPayload { slug } = parse(payload)?;
            workbook.delete_post(&slug).await?;
            tracing::info!(%slug, "post deleted");
            Ok(done("Post deleted"))
        }

        Action::LogMedia => {
            let media: MediaPayload = parse(payload)?;
            workbook.log_media(media.into()).await?;
            Ok(done("Media logged"))
        }

        read => Err(Error::InvalidAction(read.name().to_string())),
    }
}
