use std::future::Future;

use crate::error::Result;

/// 文章表
pub const POSTS_SHEET: &str = "LIVE WEBSITE";
/// 键值配置表
pub const CONFIG_SHEET: &str = "CONFIG";
/// 上传日志表
pub const MEDIA_SHEET: &str = "MEDIA";

/// 行存储接口
///
/// 一个工作簿包含若干命名的表，每张表是按顺序排列的字符串单元格行，
/// 第 0 行是表头。行没有独立于位置的 id，删除会让后续行上移。
pub trait Workbook: Clone + Send + Sync + 'static {
    /// 表是否存在
    fn has_sheet(&self, name: &str) -> impl Future<Output = Result<bool>> + Send;

    /// 读取整张表，包含表头
    ///
    /// 表不存在时返回 [`Error::SheetNotFound`](crate::error::Error::SheetNotFound)。
    fn rows(&self, name: &str) -> impl Future<Output = Result<Vec<Vec<String>>>> + Send;

    /// 在表尾追加一行
    fn append_row(&self, name: &str, row: Vec<String>)
    -> impl Future<Output = Result<()>> + Send;

    /// 覆盖指定位置的行
    fn set_row(
        &self,
        name: &str,
        index: usize,
        row: Vec<String>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// 物理删除指定位置的行
    fn delete_row(&self, name: &str, index: usize) -> impl Future<Output = Result<()>> + Send;

    /// 表不存在时以给定表头创建，返回是否新建
    fn ensure_sheet(&self, name: &str, header: &[&str])
    -> impl Future<Output = Result<bool>> + Send;
}

pub(crate) fn header_row(header: &[&str]) -> Vec<String> {
    header.iter().map(|h| h.to_string()).collect()
}
