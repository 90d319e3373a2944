use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::OrchestratorResult;

/// 可执行的任务实现
///
/// 实现必须幂等：恢复流程会从第一个任务开始整体重跑作业，
/// 已经完成过的任务会被再次调用。实现应尽快响应取消信号，
/// 但状态机只在任务边界检查取消，不会中断执行中的任务。
#[async_trait]
pub trait TaskFunction: Send + Sync {
    async fn run(
        &self,
        cancel: CancellationToken,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()>;
}
