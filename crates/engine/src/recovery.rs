use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use orchestrator_core::{traits::JobStore, OrchestratorResult};

use crate::ongoing::OngoingJobs;
use crate::runner::JobRunner;

/// 启动恢复：重新派发上次未正常结束的作业
///
/// RUNNING 状态只会在进程崩溃或被强杀时跨重启残留，正常关闭总是
/// 走到终态或留在队列里。恢复的作业从定义的第一个任务整体重跑，
/// 不做部分续跑，因此任务实现必须幂等。
pub struct RecoveryManager {
    store: Arc<dyn JobStore>,
    runner: Arc<JobRunner>,
    ongoing: OngoingJobs,
}

impl RecoveryManager {
    pub fn new(store: Arc<dyn JobStore>, runner: Arc<JobRunner>, ongoing: OngoingJobs) -> Self {
        Self {
            store,
            runner,
            ongoing,
        }
    }

    /// 找出所有 RUNNING 状态的执行实例并像新出队一样派发，
    /// 返回恢复的数量
    pub async fn recover_interrupted_jobs(&self) -> OrchestratorResult<usize> {
        let interrupted = self.store.list_running_executions().await?;
        if interrupted.is_empty() {
            debug!("没有需要恢复的作业执行");
            return Ok(0);
        }

        info!("发现 {} 个中断的作业执行，开始恢复", interrupted.len());
        let count = interrupted.len();

        for execution_id in interrupted {
            self.ongoing.insert(&execution_id).await;

            let runner = self.runner.clone();
            tokio::spawn(async move {
                if let Err(err) = runner
                    .execute_job(&execution_id, CancellationToken::new())
                    .await
                {
                    error!("恢复作业执行 {} 失败: {}", execution_id, err);
                }
            });
        }

        Ok(count)
    }
}
