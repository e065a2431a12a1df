use std::future::Future;

use super::workbook::{MEDIA_SHEET, POSTS_SHEET, Workbook};
use crate::{
    content::{MediaLogEntry, Post, PostPayload, SLUG_COLUMN},
    error::{Error, Result},
};

/// 在数据行中查找第一个 slug 相等的行，返回其在表中的绝对位置
///
/// 空 slug 不匹配任何行。
fn position_of(rows: &[Vec<String>], slug: &str) -> Option<usize> {
    if slug.is_empty() {
        return None;
    }
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.get(SLUG_COLUMN).is_some_and(|s| s == slug))
        .map(|(i, _)| i)
}

/// 文章表和媒体日志上的操作
///
/// 每次操作都线性扫描整张表定位行，重复 slug 时总是命中第一行。
pub trait PostSheet: Workbook {
    /// 全部文章，不含表头，按表中顺序
    fn all_posts(&self) -> impl Future<Output = Result<Vec<Post>>> + Send {
        async move {
            let rows = self.rows(POSTS_SHEET).await?;
            Ok(rows.iter().skip(1).map(|r| Post::from_row(r)).collect())
        }
    }

    /// 按 slug 查找文章
    fn post_by_slug(&self, slug: &str) -> impl Future<Output = Result<Post>> + Send {
        async move {
            let rows = self.rows(POSTS_SHEET).await?;
            position_of(&rows, slug)
                .map(|i| Post::from_row(&rows[i]))
                .ok_or(Error::NotFound("Post not found"))
        }
    }

    /// 追加新文章，不检查 slug 是否重复
    fn create_post(&self, payload: PostPayload) -> impl Future<Output = Result<Post>> + Send {
        async move {
            let post = payload.into_new_post()?;
            self.append_row(POSTS_SHEET, post.clone().into_row()).await?;
            Ok(post)
        }
    }

    /// 整行覆盖已有文章
    ///
    /// 先按 `slug` 查找，找不到再按 `oldSlug` 查找，以支持修改 slug。
    fn update_post(&self, payload: PostPayload) -> impl Future<Output = Result<Post>> + Send {
        async move {
            let rows = self.rows(POSTS_SHEET).await?;

            let index = payload
                .slug
                .as_deref()
                .and_then(|slug| position_of(&rows, slug))
                .or_else(|| {
                    payload
                        .old_slug
                        .as_deref()
                        .and_then(|slug| position_of(&rows, slug))
                })
                .ok_or(Error::NotFound("Post not found for update"))?;

            let post = payload.into_replacement();
            self.set_row(POSTS_SHEET, index, post.clone().into_row())
                .await?;
            Ok(post)
        }
    }

    /// 物理删除文章，只按 `slug` 精确匹配
    fn delete_post(&self, slug: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            let rows = self.rows(POSTS_SHEET).await?;
            let index =
                position_of(&rows, slug).ok_or(Error::NotFound("Post not found for deletion"))?;
            self.delete_row(POSTS_SHEET, index).await
        }
    }

    /// 追加一条上传记录
    fn log_media(&self, entry: MediaLogEntry) -> impl Future<Output = Result<()>> + Send {
        async move { self.append_row(MEDIA_SHEET, entry.into_row()).await }
    }
}

impl<W: Workbook> PostSheet for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::POST_HEADER, storage::MemoryWorkbook};

    async fn workbook() -> MemoryWorkbook {
        let book = MemoryWorkbook::new();
        book.ensure_sheet(POSTS_SHEET, &POST_HEADER).await.unwrap();
        book
    }

    fn payload(title: &str, slug: &str) -> PostPayload {
        PostPayload {
            title: Some(title.into()),
            slug: Some(slug.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let book = workbook().await;
        let created = book.create_post(payload("Hello", "hello")).await.unwrap();

        let found = book.post_by_slug("hello").await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.status, "Draft");
        assert_eq!(found.kind, "Post");
    }

    #[tokio::test]
    async fn test_empty_sheet_lists_nothing() {
        let book = workbook().await;
        assert!(book.all_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_create_does_not_append() {
        let book = workbook().await;
        assert!(book.create_post(payload("", "x")).await.is_err());
        assert!(book.create_post(payload("x", "")).await.is_err());
        assert_eq!(book.rows(POSTS_SHEET).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_hits_first_row() {
        let book = workbook().await;
        book.create_post(payload("First", "dup")).await.unwrap();
        book.create_post(payload("Second", "dup")).await.unwrap();

        assert_eq!(book.post_by_slug("dup").await.unwrap().title, "First");

        book.delete_post("dup").await.unwrap();
        assert_eq!(book.post_by_slug("dup").await.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_update_renames_slug_via_old_slug() {
        let book = workbook().await;
        let post = book.create_post(payload("Hello", "hello")).await.unwrap();

        let renamed = Post {
            slug: "hello-world".into(),
            ..post
        };
        book.update_post(PostPayload::update(renamed, "hello"))
            .await
            .unwrap();

        assert!(book.post_by_slug("hello-world").await.is_ok());
        assert!(matches!(
            book.post_by_slug("hello").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_prefers_current_slug_over_old_slug() {
        let book = workbook().await;
        book.create_post(payload("A", "a")).await.unwrap();
        book.create_post(payload("B", "b")).await.unwrap();

        let mut update = payload("B2", "b");
        update.old_slug = Some("a".into());
        book.update_post(update).await.unwrap();

        assert_eq!(book.post_by_slug("a").await.unwrap().title, "A");
        assert_eq!(book.post_by_slug("b").await.unwrap().title, "B2");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_post() {
        let book = workbook().await;
        assert!(matches!(
            book.update_post(payload("x", "nope")).await,
            Err(Error::NotFound("Post not found for update"))
        ));
        assert!(matches!(
            book.delete_post("nope").await,
            Err(Error::NotFound("Post not found for deletion"))
        ));
        assert!(matches!(
            book.post_by_slug("").await,
            Err(Error::NotFound(_))
        ));
    }
}
