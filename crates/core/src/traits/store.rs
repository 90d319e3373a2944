use async_trait::async_trait;

use crate::models::{JobDefinition, JobExecution};
use crate::OrchestratorResult;

/// 持久化存储抽象接口
///
/// 存放作业定义、执行实例，以及等待调度的执行ID的FIFO队列。
/// 每个操作一旦返回成功即视为崩溃安全；单条记录的写入是原子的，
/// 但接口不提供跨记录事务。
#[async_trait]
pub trait JobStore: Send + Sync {
    /// 保存作业定义
    async fn store_job_definition(&self, definition: &JobDefinition) -> OrchestratorResult<()>;

    /// 按ID获取作业定义，不存在时返回 `DefinitionNotFound`
    async fn get_job_definition(&self, id: &str) -> OrchestratorResult<JobDefinition>;

    /// 保存或更新执行实例，整条记录按最后写入为准
    async fn store_job_execution(&self, execution: &JobExecution) -> OrchestratorResult<()>;

    /// 按ID获取执行实例，不存在时返回 `ExecutionNotFound`
    async fn get_job_execution(&self, id: &str) -> OrchestratorResult<JobExecution>;

    /// 列出所有处于 RUNNING 状态的执行ID，用于启动恢复
    async fn list_running_executions(&self) -> OrchestratorResult<Vec<String>>;

    /// 将执行ID追加到队列尾部
    async fn enqueue_execution(&self, execution_id: &str) -> OrchestratorResult<()>;

    /// 移除并返回队首执行ID，队列为空时返回 `QueueEmpty`
    async fn dequeue_execution(&self) -> OrchestratorResult<String>;

    /// 按入队顺序列出当前队列内容
    async fn list_queued_executions(&self) -> OrchestratorResult<Vec<String>>;

    /// 当前队列长度
    async fn queued_count(&self) -> OrchestratorResult<u64>;

    /// 从队列中删除指定执行ID，幂等：删除不存在的ID不算错误
    async fn remove_from_queue(&self, execution_id: &str) -> OrchestratorResult<()>;
}
