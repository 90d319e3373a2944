use thiserror::Error;

/// 编排器错误类型定义
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("作业定义未找到: {id}")]
    DefinitionNotFound { id: String },

    #[error("作业执行实例未找到: {id}")]
    ExecutionNotFound { id: String },

    /// 队列为空是预期中的瞬时状态，调度循环据此等待重试，
    /// 不会作为失败向外传播。
    #[error("队列为空")]
    QueueEmpty,

    #[error("任务函数未注册: {name}")]
    FunctionNotRegistered { name: String },

    #[error("任务 {task_id} 重试 {retries} 次后仍然失败: {message}")]
    TaskRetriesExhausted {
        task_id: String,
        retries: u32,
        message: String,
    },

    #[error("作业执行已取消")]
    Cancelled,

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl OrchestratorError {
    /// 队列为空不是失败，调用方需要区别对待
    pub fn is_queue_empty(&self) -> bool {
        matches!(self, OrchestratorError::QueueEmpty)
    }
}

/// 统一的Result类型
pub type OrchestratorResult<T> = std::result::Result<T, OrchestratorError>;
