use super::workbook::{CONFIG_SHEET, MEDIA_SHEET, POSTS_SHEET, Workbook};
use crate::{
    config::PRIVATE_KEY_NAME,
    content::{MEDIA_HEADER, POST_HEADER},
    error::Result,
};

/// 创建三张表
///
/// 已存在的表保持不变。新建的配置表会预置一行空的签名私钥，便于运维填写。
pub async fn setup<W: Workbook>(workbook: &W) -> Result<()> {
    if workbook.ensure_sheet(CONFIG_SHEET, &["Key", "Value"]).await? {
        workbook
            .append_row(
                CONFIG_SHEET,
                vec![PRIVATE_KEY_NAME.to_string(), String::new()],
            )
            .await?;
        tracing::info!(sheet = CONFIG_SHEET, "sheet created");
    }

    if workbook.ensure_sheet(MEDIA_SHEET, &MEDIA_HEADER).await? {
        tracing::info!(sheet = MEDIA_SHEET, "sheet created");
    }

    if workbook.ensure_sheet(POSTS_SHEET, &POST_HEADER).await? {
        tracing::info!(sheet = POSTS_SHEET, "sheet created");
    }

    Ok(())
}
