use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use super::workbook::{Workbook, header_row};
use crate::error::{Error, Result};

/// 数据库连接池类型
pub type Db = sqlx::PgPool;

/// 建表语句
pub const SCHEMA: &str = include_str!("../../sql/01-CREATE_TABLE.sql");

/// 根据连接 URL 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_pool(conn_url: &str) -> Result<Db> {
    let pool = PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect(conn_url)
        .await?;
    Ok(pool)
}

/// 执行迁移语句
///
/// 按 `;` 分割，每条 SQL 单独执行
pub async fn migrate(db: &Db, sql: &str) -> Result<()> {
    for stmt in sql.split(';') {
        if stmt.trim().is_empty() {
            continue;
        }
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// Postgres 上的 [`Workbook`] 实现
///
/// 每一行存为 `(sheet, position, cells)`，位置从 0 开始，0 为表头。
#[derive(Clone)]
pub struct PgWorkbook {
    pool: Db,
}

impl PgWorkbook {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    async fn require_sheet(&self, name: &str) -> Result<()> {
        if self.has_sheet(name).await? {
            Ok(())
        } else {
            Err(Error::SheetNotFound(name.to_string()))
        }
    }
}

impl Workbook for PgWorkbook {
    async fn has_sheet(&self, name: &str) -> Result<bool> {
        let found: Option<String> = sqlx::query_scalar("SELECT name FROM sheets WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn rows(&self, name: &str) -> Result<Vec<Vec<String>>> {
        self.require_sheet(name).await?;

        let rows = sqlx::query_scalar::<_, Vec<String>>(
            "SELECT cells FROM sheet_rows WHERE sheet = $1 ORDER BY position",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn append_row(&self, name: &str, row: Vec<String>) -> Result<()> {
        self.require_sheet(name).await?;

        sqlx::query(
            "
            INSERT INTO sheet_rows (sheet, position, cells)
            SELECT $1, COALESCE(MAX(position) + 1, 0), $2
            FROM sheet_rows
            WHERE sheet = $1
            ",
        )
        .bind(name)
        .bind(row)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_row(&self, name: &str, index: usize, row: Vec<String>) -> Result<()> {
        self.require_sheet(name).await?;

        let result =
            sqlx::query("UPDATE sheet_rows SET cells = $3 WHERE sheet = $1 AND position = $2")
                .bind(name)
                .bind(index as i64)
                .bind(row)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Row not found"));
        }
        Ok(())
    }

    async fn delete_row(&self, name: &str, index: usize) -> Result<()> {
        self.require_sheet(name).await?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM sheet_rows WHERE sheet = $1 AND position = $2")
            .bind(name)
            .bind(index as i64)
            .execute(tx.as_mut())
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(Error::NotFound("Row not found"));
        }

        // 唯一约束是延迟检查的，整体平移不会中途冲突
        sqlx::query(
            "UPDATE sheet_rows SET position = position - 1 WHERE sheet = $1 AND position > $2",
        )
        .bind(name)
        .bind(index as i64)
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn ensure_sheet(&self, name: &str, header: &[&str]) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query("INSERT INTO sheets (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(tx.as_mut())
            .await?
            .rows_affected()
            == 1;

        if created {
            sqlx::query("INSERT INTO sheet_rows (sheet, position, cells) VALUES ($1, 0, $2)")
                .bind(name)
                .bind(header_row(header))
                .execute(tx.as_mut())
                .await?;
        }

        tx.commit().await?;
        Ok(created)
    }
}
