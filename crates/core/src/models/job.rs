use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskState, TaskStatus};

/// 作业状态
///
/// 状态迁移单向且单调：QUEUED -> RUNNING -> {COMPLETED, FAILED}。
/// COMPLETED 和 FAILED 是终态，终态作业不会被重新执行。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum JobStatus {
    #[serde(rename = "QUEUED")]
    Queued,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "FAILED")]
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl sqlx::Type<sqlx::Sqlite> for JobStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for JobStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "QUEUED" => Ok(JobStatus::Queued),
            "RUNNING" => Ok(JobStatus::Running),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for JobStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 作业定义：不可变的任务序列模板
///
/// `tasks` 的声明顺序即执行顺序，注册后不再修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

/// 作业执行实例：一次具体的作业运行
///
/// 入队时创建，状态机在每次状态迁移时原地更新并持久化，
/// 核心逻辑不会删除执行记录，终态记录保留供查询。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecution {
    pub id: String,
    #[serde(rename = "definitionId")]
    pub definition_id: String,
    pub status: JobStatus,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "taskStatuses", default)]
    pub task_statuses: HashMap<String, TaskStatus>,
}

impl JobExecution {
    /// 创建新的执行实例，状态为 QUEUED，ID 基于时间戳全局唯一
    pub fn new(definition_id: &str, data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: generate_execution_id(),
            definition_id: definition_id.to_string(),
            status: JobStatus::Queued,
            start_time: Utc::now(),
            end_time: None,
            data,
            task_statuses: HashMap::new(),
        }
    }
}

/// 生成时间戳派生的执行ID，形如 `exec-1700000000000000000`
fn generate_execution_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("exec-{nanos}")
}

/// 作业执行状态快照，合并执行状态与定义中的任务元信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecutionState {
    pub id: String,
    #[serde(rename = "definitionId")]
    pub definition_id: String,
    pub status: JobStatus,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    pub tasks: Vec<TaskState>,
}

impl JobExecutionState {
    /// 由执行实例与其定义组装快照，未记录状态的任务视为 PENDING
    pub fn from_execution(execution: &JobExecution, definition: &JobDefinition) -> Self {
        let tasks = definition
            .tasks
            .iter()
            .map(|task| TaskState {
                id: task.id.clone(),
                name: task.name.clone(),
                status: execution
                    .task_statuses
                    .get(&task.id)
                    .copied()
                    .unwrap_or(TaskStatus::Pending),
            })
            .collect();

        Self {
            id: execution.id.clone(),
            definition_id: execution.definition_id.clone(),
            status: execution.status,
            start_time: execution.start_time,
            tasks,
        }
    }
}
