use serde::{Deserialize, Serialize};

use super::{cell, post::now_timestamp};

/// 媒体日志表的表头
pub const MEDIA_HEADER: [&str; 3] = ["file_name", "file_url", "uploaded_at"];

/// 客户端上报的上传记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaPayload {
    #[serde(deserialize_with = "cell::string")]
    pub file_name: String,
    #[serde(deserialize_with = "cell::string")]
    pub file_url: String,
}

/// 媒体日志中的一行，只追加不回读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLogEntry {
    pub file_name: String,
    pub file_url: String,
    pub uploaded_at: String,
}

impl From<MediaPayload> for MediaLogEntry {
    fn from(payload: MediaPayload) -> Self {
        Self {
            file_name: payload.file_name,
            file_url: payload.file_url,
            uploaded_at: now_timestamp(),
        }
    }
}

impl MediaLogEntry {
    pub fn into_row(self) -> Vec<String> {
        vec![self.file_name, self.file_url, self.uploaded_at]
    }
}
