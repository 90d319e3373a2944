use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use orchestrator_core::{models::Task, OrchestratorError, OrchestratorResult};

use crate::registry::TaskRegistry;

/// 重试执行器：把单个任务跑到成功或耗尽重试预算
///
/// 每次失败后的等待时间为 2^attempt 秒（1s、2s、4s……），固定不加抖动。
/// 退避期间不检查取消信号，取消只在任务边界由状态机处理。
pub struct RetryExecutor {
    registry: Arc<TaskRegistry>,
}

impl RetryExecutor {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    /// 执行任务，总尝试次数为 max_retry + 1
    ///
    /// 函数未注册属于配置错误，立即失败且不重试。最后一次尝试仍然
    /// 失败时返回 `TaskRetriesExhausted`，携带任务ID、重试次数和最终错误。
    pub async fn run_task(
        &self,
        task: &Task,
        cancel: &CancellationToken,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()> {
        let function = self.registry.get(&task.function_name).ok_or_else(|| {
            OrchestratorError::FunctionNotRegistered {
                name: task.function_name.clone(),
            }
        })?;

        let mut attempt: u32 = 0;
        loop {
            match function.run(cancel.clone(), data).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if attempt >= task.max_retry {
                        return Err(OrchestratorError::TaskRetriesExhausted {
                            task_id: task.id.clone(),
                            retries: task.max_retry,
                            message: err.to_string(),
                        });
                    }

                    // 移位上限防止 max_retry 配置过大时溢出
                    let backoff = Duration::from_secs(1u64 << attempt.min(62));
                    warn!(
                        "任务 {} 第 {} 次尝试失败: {}，{}秒后重试",
                        task.id,
                        attempt + 1,
                        err,
                        backoff.as_secs()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
