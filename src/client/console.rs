use chrono::Utc;

use super::{
    CmsClient, ImageFile, ImageUploader,
    settings::{API_URL_KEY, PUBLIC_KEY_KEY, SettingsStore},
};
use crate::{
    api::SystemStatus,
    content::{Post, slugify},
    error::{Error, Result},
};

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 未配置后端地址
    Demo,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// 最近一次操作的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
}

/// 管理控制台的客户端状态
///
/// 持有内存中的文章列表和当前编辑目标，把每个用户操作翻译成一次 action 调用。
/// 所有错误都会记录为提示，控制台始终可用。
pub struct Console<S> {
    settings: S,
    http: reqwest::Client,
    client: CmsClient,
    uploader: ImageUploader,
    posts: Vec<Post>,
    editing: Option<Post>,
    notification: Option<Notification>,
}

impl<S: SettingsStore> Console<S> {
    /// 从本地设置创建控制台
    pub fn new(settings: S, http: reqwest::Client) -> Self {
        let client = CmsClient::new(http.clone(), settings.api_url());
        let uploader = ImageUploader::new(http.clone());

        Self {
            settings,
            http,
            client,
            uploader,
            posts: Vec::new(),
            editing: None,
            notification: None,
        }
    }

    pub fn with_uploader(mut self, uploader: ImageUploader) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn connection(&self) -> ConnectionState {
        if self.client.is_configured() {
            ConnectionState::Connected
        } else {
            ConnectionState::Demo
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn editing(&self) -> Option<&Post> {
        self.editing.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NoticeKind::Success => tracing::info!(%message),
            NoticeKind::Error => tracing::warn!(%message),
        }
        self.notification = Some(Notification { message, kind });
    }

    /// 重新拉取全部文章
    pub async fn fetch_posts(&mut self) -> Result<()> {
        match self.client.get_all_posts().await {
            Ok(posts) => {
                self.posts = posts;
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// 开始新建，返回预填默认值的空白文章
    pub fn begin_create(&mut self) -> Post {
        self.editing = None;
        Post {
            status: "Draft".to_string(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
            kind: "Post".to_string(),
            ..Default::default()
        }
    }

    /// 以标题开始新建，slug 由标题生成
    pub fn begin_create_titled(&mut self, title: &str) -> Post {
        Post {
            title: title.to_string(),
            slug: slugify(title),
            ..self.begin_create()
        }
    }

    /// 开始编辑列表中的文章，返回其副本
    pub fn begin_edit(&mut self, slug: &str) -> Result<Post> {
        let post = self
            .posts
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or(Error::NotFound("Post not found"))?;
        self.editing = Some(post.clone());
        Ok(post)
    }

    /// 保存文章
    ///
    /// 有编辑目标时以其原 slug 作为 `oldSlug` 更新，否则新建。成功后刷新列表。
    pub async fn save_post(&mut self, post: &Post) -> Result<()> {
        let result = match &self.editing {
            Some(original) => self.client.update_post(post, &original.slug).await,
            None => self.client.create_post(post).await,
        };

        match result {
            Ok(message) => {
                self.editing = None;
                self.notify(
                    NoticeKind::Success,
                    message.unwrap_or_else(|| "Saved successfully".to_string()),
                );
                // 列表刷新失败只影响提示
                self.fetch_posts().await.ok();
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// 删除文章，成功后刷新列表
    pub async fn delete_post(&mut self, slug: &str) -> Result<()> {
        match self.client.delete_post(slug).await {
            Ok(_) => {
                self.notify(NoticeKind::Success, "Post deleted");
                self.fetch_posts().await.ok();
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeKind::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// 保存后端地址和图床公钥，并切换到新地址
    pub fn save_settings(&mut self, api_url: &str, public_key: Option<&str>) -> Result<()> {
        self.settings.set(API_URL_KEY, api_url)?;
        if let Some(key) = public_key {
            self.settings.set(PUBLIC_KEY_KEY, key)?;
        }

        self.client = CmsClient::new(self.http.clone(), self.settings.api_url());
        self.notify(NoticeKind::Success, "Settings saved");
        Ok(())
    }

    /// 为文章上传图片，成功后 `post.image` 指向新地址
    pub async fn upload_image(&mut self, post: &mut Post, file: ImageFile) -> Result<String> {
        let public_key = self.settings.public_key();
        let result = self
            .uploader
            .upload(&self.client, &public_key, post, file)
            .await;

        if let Err(e) = &result {
            self.notify(NoticeKind::Error, format!("Upload Error: {e}"));
        }
        result
    }

    /// 运维诊断，只在用户触发时调用
    pub async fn system_status(&mut self) -> Result<SystemStatus> {
        let result = self.client.get_system_status().await;
        if let Err(e) = &result {
            self.notify(NoticeKind::Error, e.to_string());
        }
        result
    }
}
