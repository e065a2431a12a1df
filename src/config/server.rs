use std::{env, str::FromStr, time::Duration};

/// 服务端配置
///
/// 全部从环境变量读取：
///
/// - `SHEETCMS_ADDR`：监听地址，默认 `0.0.0.0:3000`
/// - `SHEETCMS_LOCK_WAIT_MS`：全局锁的最长等待时间，默认 10000
/// - `SHEETCMS_UPLOAD_EXPIRE_SECS`：上传凭证有效期，默认 2400
/// - `DATABASE_URL`：可选，设置后使用 Postgres 存储
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub lock_wait: Duration,
    pub upload_expire_secs: i64,
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            lock_wait: Duration::from_millis(10_000),
            upload_expire_secs: 2400,
            database_url: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "invalid value, using default");
            None
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            addr: env::var("SHEETCMS_ADDR").unwrap_or(default.addr),
            lock_wait: parse_var("SHEETCMS_LOCK_WAIT_MS")
                .map(Duration::from_millis)
                .unwrap_or(default.lock_wait),
            upload_expire_secs: parse_var("SHEETCMS_UPLOAD_EXPIRE_SECS")
                .unwrap_or(default.upload_expire_secs),
            database_url: env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
        }
    }
}
