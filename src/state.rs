use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;

use crate::{
    api::ScriptLock,
    config::{ConfigResolver, ServerConfig},
    storage::Workbook,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了工作簿、配置解析器和全局锁，提供统一访问入口。
#[derive(Clone)]
pub struct AppState<W> {
    workbook: W,
    resolver: Arc<ConfigResolver>,
    lock: ScriptLock,
    config: Arc<ServerConfig>,
}

impl<W: Workbook> AppState<W> {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(workbook: W, resolver: ConfigResolver, config: ServerConfig) -> Self {
        Self {
            workbook,
            resolver: Arc::new(resolver),
            lock: ScriptLock::default(),
            config: Arc::new(config),
        }
    }

    /// 获取工作簿
    pub fn workbook(&self) -> &W {
        &self.workbook
    }

    /// 获取配置解析器
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// 获取服务端配置
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// 在有限时间内获取全局锁
    ///
    /// 超时返回 `None`，调用方仍会继续处理请求。
    pub async fn acquire(&self) -> Option<OwnedMutexGuard<()>> {
        let guard = self.lock.try_lock_for(self.config.lock_wait).await;
        if guard.is_none() {
            tracing::warn!(
                wait_ms = self.config.lock_wait.as_millis() as u64,
                "script lock timed out, proceeding unguarded"
            );
        }
        guard
    }
}
