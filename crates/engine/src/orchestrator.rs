use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

use orchestrator_core::{
    models::{JobDefinition, JobExecution, JobExecutionState, SystemState},
    traits::JobStore,
    OrchestratorError, OrchestratorResult,
};

use crate::ongoing::OngoingJobs;
use crate::recovery::RecoveryManager;
use crate::registry::TaskRegistry;
use crate::runner::JobRunner;
use crate::scheduler::QueueScheduler;

/// 编排引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 同时执行的作业数量上限
    pub max_concurrent: usize,
    /// 队列为空时协调循环的等待间隔
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// 编排器门面：组合存储、注册表、状态机、调度循环与启动恢复，
/// 向API层暴露注册、入队和状态查询操作
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    registry: Arc<TaskRegistry>,
    ongoing: OngoingJobs,
    shutdown_tx: broadcast::Sender<()>,
    scheduler_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// 创建并启动编排器：先恢复中断的作业，再启动调度循环
    pub async fn start(
        store: Arc<dyn JobStore>,
        registry: Arc<TaskRegistry>,
        config: EngineConfig,
    ) -> OrchestratorResult<Arc<Self>> {
        let ongoing = OngoingJobs::new();
        let runner = Arc::new(JobRunner::new(
            store.clone(),
            registry.clone(),
            ongoing.clone(),
        ));

        let recovery = RecoveryManager::new(store.clone(), runner.clone(), ongoing.clone());
        let recovered = recovery.recover_interrupted_jobs().await?;
        if recovered > 0 {
            info!("启动恢复完成，重新派发了 {} 个作业执行", recovered);
        }

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let scheduler = QueueScheduler::new(
            store.clone(),
            runner,
            config.max_concurrent,
            config.poll_interval,
        );
        let scheduler_handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

        Ok(Arc::new(Self {
            store,
            registry,
            ongoing,
            shutdown_tx,
            scheduler_handle: Mutex::new(Some(scheduler_handle)),
        }))
    }

    /// 注册作业定义
    ///
    /// 定义中每个任务的函数名都必须已有注册实现，否则拒绝注册——
    /// 保证任何引用该定义的执行开始前实现齐全。
    pub async fn register_job_definition(
        &self,
        definition: &JobDefinition,
    ) -> OrchestratorResult<()> {
        for task in &definition.tasks {
            if !self.registry.contains(&task.function_name) {
                return Err(OrchestratorError::FunctionNotRegistered {
                    name: task.function_name.clone(),
                });
            }
        }

        self.store.store_job_definition(definition).await?;
        info!("注册作业定义: {}", definition.id);
        Ok(())
    }

    /// 创建执行实例并入队，返回执行ID
    ///
    /// 创建路径上的持久化失败直接向调用方返回。持久化执行记录与
    /// 写入队列条目之间没有跨记录事务，两步之间崩溃可能留下
    /// 已持久化但未入队的执行。
    pub async fn enqueue_job(
        &self,
        definition_id: &str,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<String> {
        // definition_id 必须能解析到已注册的定义
        self.store.get_job_definition(definition_id).await?;

        let execution = JobExecution::new(definition_id, data);
        self.store.store_job_execution(&execution).await?;
        self.store.enqueue_execution(&execution.id).await?;

        info!("作业 {} 已入队，执行ID {}", definition_id, execution.id);
        Ok(execution.id)
    }

    /// 查询单个执行实例的状态快照，纯读操作
    pub async fn get_job_execution_state(
        &self,
        execution_id: &str,
    ) -> OrchestratorResult<JobExecutionState> {
        let execution = self.store.get_job_execution(execution_id).await?;
        let definition = self.store.get_job_definition(&execution.definition_id).await?;
        Ok(JobExecutionState::from_execution(&execution, &definition))
    }

    /// 按需汇总系统状态：正在执行的作业加上当前队列内容
    pub async fn get_system_state(&self) -> OrchestratorResult<SystemState> {
        let mut active_jobs = Vec::new();
        for execution_id in self.ongoing.snapshot().await {
            // 快照拿到的ID可能刚好结束，查不到状态时跳过
            if let Ok(state) = self.get_job_execution_state(&execution_id).await {
                active_jobs.push(state);
            }
        }

        let queued_jobs = self.store.list_queued_executions().await?;
        let queued_count = self.store.queued_count().await?;

        Ok(SystemState {
            active_jobs,
            queued_jobs,
            queued_count,
        })
    }

    /// 通知调度循环停止并等待其退出
    ///
    /// 不等待已派发的作业，它们在后台继续执行直至终态。
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        let handle = self.scheduler_handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                error!("等待调度循环退出失败: {}", err);
            }
        }
        info!("编排器已停止");
    }
}
