use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

/// 正在执行的作业ID集合
///
/// 由多个并发的作业执行写入、由状态查询并发读取。集合归调度组件
/// 所有，外部只能通过 `snapshot` 读取，不暴露直接修改入口。
#[derive(Clone, Default)]
pub struct OngoingJobs {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl OngoingJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, execution_id: &str) {
        self.inner.write().await.insert(execution_id.to_string());
    }

    pub(crate) async fn remove(&self, execution_id: &str) {
        self.inner.write().await.remove(execution_id);
    }

    pub async fn contains(&self, execution_id: &str) -> bool {
        self.inner.read().await.contains(execution_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// 当前集合的一致快照
    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.read().await.iter().cloned().collect()
    }
}
