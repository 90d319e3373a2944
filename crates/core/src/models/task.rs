use serde::{Deserialize, Serialize};

/// 任务状态
///
/// PENDING 是隐式状态：执行实例的 task_statuses 中没有条目即为 PENDING。
/// 状态只能单向推进 PENDING -> RUNNING -> {COMPLETED, FAILED}。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "FAILED")]
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// 作业定义中的单个任务
///
/// 任务一经创建不可变。`function_name` 是任务注册表中的键，
/// 执行前必须有对应的已注册实现。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// 首次尝试之后允许的重试次数，总尝试次数为 max_retry + 1
    #[serde(rename = "maxRetry")]
    pub max_retry: u32,
    #[serde(rename = "functionName")]
    pub function_name: String,
}

/// 任务状态快照，用于状态查询接口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskState {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
}
