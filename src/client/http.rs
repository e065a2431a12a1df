use serde::{Serialize, de::DeserializeOwned};

use crate::{
    api::{Action, Envelope, SystemStatus},
    content::{MediaPayload, Post, PostPayload, SlugPayload},
    credentials::UploadCredentials,
    error::{Error, Result},
};

/// 后端地址未配置时的提示
pub const NOT_CONFIGURED: &str =
    "API URL not configured. Please go to Settings to connect your backend.";

/// 后端 action 的 HTTP 客户端
///
/// 每个用户操作发一个请求，不排队、不重试。只以信封中的 `status` 判断成败，
/// 不看 HTTP 状态码。
#[derive(Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    base_url: String,
}

/// 创建带 User-Agent 的 reqwest 客户端
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;
    Ok(client)
}

impl CmsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// 是否已配置后端地址
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// 在后端地址上追加 `action` 参数，地址已带查询串时用 `&` 连接
    pub fn action_url(&self, action: Action) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}action={}", self.base_url, sep, action)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(Error::Config(NOT_CONFIGURED.to_string()))
        }
    }

    /// 发送读请求，额外参数经 URL 编码附加在查询串中
    pub async fn request_get<T: DeserializeOwned>(
        &self,
        action: Action,
        params: &[(&str, &str)],
    ) -> Result<Envelope<T>> {
        self.ensure_configured()?;

        let envelope = self
            .http
            .get(self.action_url(action))
            .query(params)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// 发送写请求，请求体为 JSON
    pub async fn request_post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        action: Action,
        body: &B,
    ) -> Result<Envelope<T>> {
        self.ensure_configured()?;

        let envelope = self
            .http
            .post(self.action_url(action))
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    pub async fn get_all_posts(&self) -> Result<Vec<Post>> {
        self.request_get(Action::GetAllPosts, &[])
            .await?
            .into_data("Failed to fetch posts")
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Post> {
        self.request_get(Action::GetPostBySlug, &[("slug", slug)])
            .await?
            .into_data("Post not found")
    }

    pub async fn create_post(&self, post: &Post) -> Result<Option<String>> {
        self.request_post::<(), _>(Action::CreatePost, &PostPayload::from(post.clone()))
            .await?
            .into_message("Error saving post")
    }

    /// 整行覆盖，`old_slug` 为编辑前的 slug
    pub async fn update_post(&self, post: &Post, old_slug: &str) -> Result<Option<String>> {
        self.request_post::<(), _>(
            Action::UpdatePost,
            &PostPayload::update(post.clone(), old_slug),
        )
        .await?
        .into_message("Error saving post")
    }

    pub async fn delete_post(&self, slug: &str) -> Result<Option<String>> {
        let body = SlugPayload {
            slug: slug.to_string(),
        };
        self.request_post::<(), _>(Action::DeletePost, &body)
            .await?
            .into_message("Error deleting")
    }

    pub async fn auth_image_kit(&self) -> Result<UploadCredentials> {
        self.request_get(Action::AuthImageKit, &[])
            .await?
            .into_data("Failed to authenticate with ImageKit")
    }

    pub async fn log_media(&self, media: &MediaPayload) -> Result<Option<String>> {
        self.request_post::<(), _>(Action::LogMedia, media)
            .await?
            .into_message("Failed to log media")
    }

    pub async fn get_system_status(&self) -> Result<SystemStatus> {
        self.request_get(Action::GetSystemStatus, &[])
            .await?
            .into_data("Failed to read system status")
    }
}
