use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use orchestrator_core::{
    models::{JobDefinition, JobExecution, JobStatus, TaskStatus},
    traits::JobStore,
    OrchestratorError, OrchestratorResult,
};

use crate::ongoing::OngoingJobs;
use crate::registry::TaskRegistry;
use crate::retry::RetryExecutor;

/// 作业状态机：驱动单个执行实例走完任务序列
///
/// 每次作业级和任务级的状态迁移都同步持久化，崩溃发生在两步之间时，
/// 存储中保留的是最后一次完成的迁移。
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    retry: RetryExecutor,
    ongoing: OngoingJobs,
}

impl JobRunner {
    pub fn new(store: Arc<dyn JobStore>, registry: Arc<TaskRegistry>, ongoing: OngoingJobs) -> Self {
        Self {
            store,
            retry: RetryExecutor::new(registry),
            ongoing,
        }
    }

    /// 执行一个作业实例
    ///
    /// 终态实例直接返回（幂等空操作，防止恢复流程与正常派发重复执行）。
    /// 无论成功、失败还是取消，退出时总会：移出 ongoing 集合、写入
    /// end_time、持久化最终状态、从队列删除该执行ID。
    pub async fn execute_job(
        &self,
        execution_id: &str,
        cancel: CancellationToken,
    ) -> OrchestratorResult<()> {
        let mut execution = self.store.get_job_execution(execution_id).await?;

        if execution.status.is_terminal() {
            return Ok(());
        }

        // 定义解析失败在状态迁移之前返回，不会留下 RUNNING 记录
        let definition = self.store.get_job_definition(&execution.definition_id).await?;

        execution.status = JobStatus::Running;
        self.store.store_job_execution(&execution).await?;
        self.ongoing.insert(execution_id).await;
        info!("作业执行 {} 进入 RUNNING", execution_id);

        let result = self.run_tasks(&definition, &mut execution, &cancel).await;

        // 清理在所有退出路径上无条件执行
        self.ongoing.remove(execution_id).await;
        execution.end_time = Some(Utc::now());
        if let Err(err) = self.store.store_job_execution(&execution).await {
            error!("作业执行 {} 结束后持久化失败: {}", execution_id, err);
        }
        if let Err(err) = self.store.remove_from_queue(execution_id).await {
            error!("从队列删除执行 {} 失败: {}", execution_id, err);
        }

        match &result {
            Ok(()) => info!("作业执行 {} 完成", execution_id),
            Err(err) => info!("作业执行 {} 以失败结束: {}", execution_id, err),
        }
        result
    }

    /// 按声明顺序串行执行任务，单个任务重试耗尽即整个作业失败，
    /// 后续任务不再执行
    async fn run_tasks(
        &self,
        definition: &JobDefinition,
        execution: &mut JobExecution,
        cancel: &CancellationToken,
    ) -> OrchestratorResult<()> {
        for task in &definition.tasks {
            // 取消只在任务边界观察
            if cancel.is_cancelled() {
                execution
                    .task_statuses
                    .insert(task.id.clone(), TaskStatus::Failed);
                execution.status = JobStatus::Failed;
                return Err(OrchestratorError::Cancelled);
            }

            execution
                .task_statuses
                .insert(task.id.clone(), TaskStatus::Running);
            self.persist_transition(execution).await;

            match self.retry.run_task(task, cancel, &execution.data).await {
                Ok(()) => {
                    execution
                        .task_statuses
                        .insert(task.id.clone(), TaskStatus::Completed);
                    self.persist_transition(execution).await;
                }
                Err(err) => {
                    execution
                        .task_statuses
                        .insert(task.id.clone(), TaskStatus::Failed);
                    execution.status = JobStatus::Failed;
                    self.persist_transition(execution).await;
                    return Err(err);
                }
            }
        }

        execution.status = JobStatus::Completed;
        self.store.store_job_execution(execution).await?;
        Ok(())
    }

    /// 状态迁移过程中的记账写入尽力而为：失败只记日志，
    /// 不中断执行，避免丢掉已经完成的工作
    async fn persist_transition(&self, execution: &JobExecution) {
        if let Err(err) = self.store.store_job_execution(execution).await {
            error!("持久化执行 {} 状态迁移失败: {}", execution.id, err);
        }
    }
}
