use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// 进程级的全局互斥锁，所有请求的处理都串行在它后面
///
/// 只在单个进程内生效。
#[derive(Clone, Default)]
pub struct ScriptLock(Arc<Mutex<()>>);

impl ScriptLock {
    /// 最多等待 `wait`，超时返回 `None`
    pub async fn try_lock_for(&self, wait: Duration) -> Option<OwnedMutexGuard<()>> {
        tokio::time::timeout(wait, self.0.clone().lock_owned())
            .await
            .ok()
    }
}
