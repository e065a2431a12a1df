use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;

use crate::error::{Error, Result};

/// 后端地址
pub const API_URL_KEY: &str = "cms_api_url";
/// 图床公钥
pub const PUBLIC_KEY_KEY: &str = "cms_ik_public_key";

/// 客户端本地设置
///
/// 按名称读写字符串，没有过期，也不做校验。
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// 后端地址，未设置时为空字符串
    fn api_url(&self) -> String {
        self.get(API_URL_KEY).unwrap_or_default()
    }

    /// 图床公钥，未设置时为空字符串
    fn public_key(&self) -> String {
        self.get(PUBLIC_KEY_KEY).unwrap_or_default()
    }
}

/// 只存在内存中的设置
#[derive(Debug, Clone, Default)]
pub struct MemorySettings(HashMap<String, String>);

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 持久化到 TOML 文件的设置，每次写入都落盘
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettings {
    /// 打开指定路径的设置文件，文件不存在时视为空
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// 打开平台配置目录下的 `settings.toml`
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "sheetcms", "sheetcms")
            .ok_or_else(|| Error::Config("Failed to get project directories".to_string()))?;
        Self::open(dirs.config_dir().join("settings.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, toml::to_string(&self.values)?)?;
        Ok(())
    }
}
