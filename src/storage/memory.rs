use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::workbook::{Workbook, header_row};
use crate::error::{Error, Result};

/// 进程内的 [`Workbook`] 实现
///
/// 未配置数据库时使用，重启后数据丢失。
#[derive(Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Arc<RwLock<HashMap<String, Vec<Vec<String>>>>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(name: &str) -> Error {
    Error::SheetNotFound(name.to_string())
}

impl Workbook for MemoryWorkbook {
    async fn has_sheet(&self, name: &str) -> Result<bool> {
        Ok(self.sheets.read().await.contains_key(name))
    }

    async fn rows(&self, name: &str) -> Result<Vec<Vec<String>>> {
        self.sheets
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| missing(name))
    }

    async fn append_row(&self, name: &str, row: Vec<String>) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        sheets.get_mut(name).ok_or_else(|| missing(name))?.push(row);
        Ok(())
    }

    async fn set_row(&self, name: &str, index: usize, row: Vec<String>) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        let slot = sheets
            .get_mut(name)
            .ok_or_else(|| missing(name))?
            .get_mut(index)
            .ok_or(Error::NotFound("Row not found"))?;
        *slot = row;
        Ok(())
    }

    async fn delete_row(&self, name: &str, index: usize) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        let rows = sheets.get_mut(name).ok_or_else(|| missing(name))?;
        if index >= rows.len() {
            return Err(Error::NotFound("Row not found"));
        }
        rows.remove(index);
        Ok(())
    }

    async fn ensure_sheet(&self, name: &str, header: &[&str]) -> Result<bool> {
        let mut sheets = self.sheets.write().await;
        if sheets.contains_key(name) {
            return Ok(false);
        }
        sheets.insert(name.to_string(), vec![header_row(header)]);
        Ok(true)
    }
}
