//! 单元格取值的反序列化
//!
//! 表中每个单元格都是自由字符串，客户端提交的数字、布尔值按其 JSON 文本保存，
//! `null` 视为缺省。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn to_cell(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// 可缺省的单元格
pub(crate) fn optional<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(de)?.and_then(to_cell))
}

/// 必有的单元格，`null` 读作空字符串
pub(crate) fn string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional(de)?.unwrap_or_default())
}
