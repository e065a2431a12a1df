use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::cell;
use crate::error::{Error, Result};

/// 文章表的列数，列顺序即存储格式
pub const POST_COLUMNS: usize = 9;

/// slug 所在的列
pub const SLUG_COLUMN: usize = 4;

/// 文章表的表头
pub const POST_HEADER: [&str; POST_COLUMNS] = [
    "Title", "Label", "Image", "Content", "Slug", "Description", "Status", "Date", "Type",
];

/// 一篇文章，对应文章表中的一行
///
/// 字段按位置映射：`title, label, image, content, slug, description, status, date, type`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub label: String,
    pub image: String,
    pub content: String,
    pub slug: String,
    pub description: String,
    /// `Draft` / `Published` / `Archived`，不做校验
    pub status: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Post {
    /// 从一行单元格构建文章，缺失的尾部单元格视为空字符串
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();

        Self {
            title: cell(0),
            label: cell(1),
            image: cell(2),
            content: cell(3),
            slug: cell(4),
            description: cell(5),
            status: cell(6),
            date: cell(7),
            kind: cell(8),
        }
    }

    /// 按列顺序展开为一行
    pub fn into_row(self) -> Vec<String> {
        vec![
            self.title,
            self.label,
            self.image,
            self.content,
            self.slug,
            self.description,
            self.status,
            self.date,
            self.kind,
        ]
    }
}

/// 客户端提交的文章数据
///
/// 所有字段都可缺省。`oldSlug` 只在更新时使用，表示编辑前的 slug。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostPayload {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "cell::optional")]
    pub date: Option<String>,
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "cell::optional"
    )]
    pub kind: Option<String>,
    #[serde(
        rename = "oldSlug",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "cell::optional"
    )]
    pub old_slug: Option<String>,
}

/// 空字符串与缺省同等对待
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// 当前时间，RFC 3339 格式，精确到毫秒
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 由标题生成 slug
///
/// 转为小写，连续的非 `[a-z0-9]` 字符折叠为一个 `-`，并去掉首尾的 `-`。
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut gap = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

impl PostPayload {
    /// 生成新建文章的行
    ///
    /// `title` 和 `slug` 必填，其余字段缺省时填充默认值。
    pub fn into_new_post(self) -> Result<Post> {
        let (Some(title), Some(slug)) = (non_empty(self.title), non_empty(self.slug)) else {
            return Err(Error::Validation("Title and Slug are required"));
        };

        Ok(Post {
            title,
            label: self.label.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            slug,
            description: self.description.unwrap_or_default(),
            status: non_empty(self.status).unwrap_or_else(|| "Draft".to_string()),
            date: non_empty(self.date).unwrap_or_else(now_timestamp),
            kind: non_empty(self.kind).unwrap_or_else(|| "Post".to_string()),
        })
    }

    /// 生成整行覆盖用的文章
    ///
    /// 不与旧行合并：缺省字段会被写成空字符串。
    pub fn into_replacement(self) -> Post {
        Post {
            title: self.title.unwrap_or_default(),
            label: self.label.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            slug: self.slug.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
        }
    }

    /// 用完整的文章构建更新载荷
    pub fn update(post: Post, old_slug: impl Into<String>) -> Self {
        Self {
            old_slug: Some(old_slug.into()),
            ..Self::from(post)
        }
    }
}

impl From<Post> for PostPayload {
    fn from(post: Post) -> Self {
        Self {
            title: Some(post.title),
            label: Some(post.label),
            image: Some(post.image),
            content: Some(post.content),
            slug: Some(post.slug),
            description: Some(post.description),
            status: Some(post.status),
            date: Some(post.date),
            kind: Some(post.kind),
            old_slug: None,
        }
    }
}

/// 只携带 slug 的载荷，用于删除
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugPayload {
    #[serde(deserialize_with = "cell::string")]
    pub slug: String,
}
