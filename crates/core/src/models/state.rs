use serde::{Deserialize, Serialize};

use super::job::JobExecutionState;

/// 系统整体状态：正在执行的作业加上当前队列内容
///
/// 按需派生，从不持久化。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemState {
    #[serde(rename = "activeJobs")]
    pub active_jobs: Vec<JobExecutionState>,
    #[serde(rename = "queuedJobs")]
    pub queued_jobs: Vec<String>,
    #[serde(rename = "queuedCount")]
    pub queued_count: u64,
}
