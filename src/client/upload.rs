use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::CmsClient;
use crate::{
    content::{MediaPayload, Post},
    error::{Error, Result},
};

/// 图床的公开上传地址
pub const IMAGEKIT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";

/// 待上传的文件
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UploadResponse {
    url: Option<String>,
    message: Option<String>,
}

/// 浏览器直传图床的流程
///
/// 顺序执行，没有并行，也不回滚已完成的步骤：
///
/// 1. 向后端申请上传凭证
/// 2. 把文件和凭证以 multipart 提交给图床
/// 3. 通过 `logMedia` 记录上传结果
/// 4. 把返回的地址写入文章的 `image` 字段
///
/// 第 4 步只在记录成功后执行，记录失败时文章保持不变。
#[derive(Clone)]
pub struct ImageUploader {
    http: reqwest::Client,
    endpoint: String,
}

impl ImageUploader {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: IMAGEKIT_UPLOAD_URL.to_string(),
        }
    }

    /// 替换上传地址
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// 上传图片并写入文章，返回图片地址
    ///
    /// 公钥为空时直接失败，不发出任何请求。
    pub async fn upload(
        &self,
        cms: &CmsClient,
        public_key: &str,
        post: &mut Post,
        file: ImageFile,
    ) -> Result<String> {
        if public_key.is_empty() {
            return Err(Error::Config(
                "Please configure ImageKit Public Key in Settings first.".to_string(),
            ));
        }

        let creds = cms.auth_image_kit().await?;

        let form = Form::new()
            .part("file", Part::bytes(file.bytes).file_name(file.name.clone()))
            .text("fileName", file.name.clone())
            .text("publicKey", public_key.to_string())
            .text("signature", creds.signature)
            .text("expire", creds.expire.to_string())
            .text("token", creds.token)
            .text("useUniqueFileName", "true");

        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        let accepted = resp.status().is_success();
        let body: UploadResponse = resp.json().await?;

        let url = match (accepted, body.url) {
            (true, Some(url)) if !url.is_empty() => url,
            _ => {
                return Err(Error::Upload(
                    body.message
                        .unwrap_or_else(|| "Image upload failed".to_string()),
                ));
            }
        };
        tracing::debug!(%url, file = %file.name, "image uploaded");

        cms.log_media(&MediaPayload {
            file_name: file.name,
            file_url: url.clone(),
        })
        .await?;

        post.image = url.clone();
        Ok(url)
    }
}
