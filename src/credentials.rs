use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// 图床直传凭证
///
/// 客户端拿到后连同公钥一起提交给图床，私钥不离开服务端。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCredentials {
    pub token: String,
    /// 过期时间，Unix 秒
    pub expire: i64,
    pub signature: String,
}

/// 对 `token` 与 `expire` 的十进制拼接做 HMAC-SHA1，输出小写十六进制
pub fn sign(private_key: &str, token: &str, expire: i64) -> String {
    let mut mac =
        HmacSha1::new_from_slice(private_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(token.as_bytes());
    mac.update(expire.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// 签发一份新凭证，有效期为 `now + window_secs`
pub fn issue(private_key: &str, now: i64, window_secs: i64) -> UploadCredentials {
    let token = uuid::Uuid::new_v4().to_string();
    let expire = now + window_secs;
    let signature = sign(private_key, &token, expire);

    UploadCredentials {
        token,
        expire,
        signature,
    }
}
