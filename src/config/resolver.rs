use std::{collections::HashMap, env, sync::Arc};

use crate::{
    error::Result,
    storage::{CONFIG_SHEET, Workbook},
};

/// 签名私钥的配置名
pub const PRIVATE_KEY_NAME: &str = "IMAGEKIT_PRIVATE_KEY";

/// 从进程环境读取的受保护配置
const PROPERTY_KEYS: [&str; 1] = [PRIVATE_KEY_NAME];

/// 受保护的键值存储，不对客户端可见
#[derive(Debug, Clone, Default)]
pub struct ScriptProperties(Arc<HashMap<String, String>>);

impl ScriptProperties {
    /// 从环境变量加载已知的配置项，空值忽略
    pub fn from_env() -> Self {
        let props = PROPERTY_KEYS
            .iter()
            .filter_map(|key| {
                env::var(key)
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v))
            })
            .collect();
        Self(Arc::new(props))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// 配置来源
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// 受保护的键值存储
    Properties(ScriptProperties),
    /// 工作簿中的 `CONFIG` 表，第一列为键，第二列为值
    Sheet,
}

impl ConfigSource {
    async fn lookup<W: Workbook>(&self, workbook: &W, key: &str) -> Result<Option<String>> {
        match self {
            ConfigSource::Properties(props) => Ok(props.get(key).map(str::to_string)),
            ConfigSource::Sheet => {
                if !workbook.has_sheet(CONFIG_SHEET).await? {
                    return Ok(None);
                }
                let rows = workbook.rows(CONFIG_SHEET).await?;
                Ok(rows
                    .iter()
                    .skip(1)
                    .find(|row| row.first().is_some_and(|k| k == key))
                    .and_then(|row| row.get(1).cloned()))
            }
        }
    }
}

/// 按顺序查询各个来源，第一个非空值胜出
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    sources: Vec<ConfigSource>,
}

impl ConfigResolver {
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self { sources }
    }

    /// 先查受保护存储，再查 `CONFIG` 表
    pub fn standard(props: ScriptProperties) -> Self {
        Self::new(vec![ConfigSource::Properties(props), ConfigSource::Sheet])
    }

    pub async fn get<W: Workbook>(&self, workbook: &W, key: &str) -> Result<Option<String>> {
        for source in &self.sources {
            if let Some(value) = source.lookup(workbook, key).await? {
                if !value.is_empty() {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }
}
