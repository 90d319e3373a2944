#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use orchestrator_core::{
    models::{JobDefinition, JobExecution, JobStatus, Task},
    traits::{JobStore, TaskFunction},
    OrchestratorError, OrchestratorResult,
};

/// 内存版存储，测试专用
///
/// `history` 记录每次执行实例写入的完整快照，用来断言状态只会单向推进。
#[derive(Default)]
pub struct MemoryJobStore {
    definitions: Mutex<HashMap<String, JobDefinition>>,
    executions: Mutex<HashMap<String, JobExecution>>,
    queue: Mutex<VecDeque<String>>,
    pub history: Mutex<Vec<JobExecution>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn store_job_definition(&self, definition: &JobDefinition) -> OrchestratorResult<()> {
        self.definitions
            .lock()
            .unwrap()
            .insert(definition.id.clone(), definition.clone());
        Ok(())
    }

    async fn get_job_definition(&self, id: &str) -> OrchestratorResult<JobDefinition> {
        self.definitions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::DefinitionNotFound { id: id.to_string() })
    }

    async fn store_job_execution(&self, execution: &JobExecution) -> OrchestratorResult<()> {
        self.history.lock().unwrap().push(execution.clone());
        self.executions
            .lock()
            .unwrap()
            .insert(execution.id.clone(), execution.clone());
        Ok(())
    }

    async fn get_job_execution(&self, id: &str) -> OrchestratorResult<JobExecution> {
        self.executions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::ExecutionNotFound { id: id.to_string() })
    }

    async fn list_running_executions(&self) -> OrchestratorResult<Vec<String>> {
        Ok(self
            .executions
            .lock()
            .unwrap()
            .values()
            .filter(|execution| execution.status == JobStatus::Running)
            .map(|execution| execution.id.clone())
            .collect())
    }

    async fn enqueue_execution(&self, execution_id: &str) -> OrchestratorResult<()> {
        let mut queue = self.queue.lock().unwrap();
        if !queue.iter().any(|id| id == execution_id) {
            queue.push_back(execution_id.to_string());
        }
        Ok(())
    }

    async fn dequeue_execution(&self) -> OrchestratorResult<String> {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(OrchestratorError::QueueEmpty)
    }

    async fn list_queued_executions(&self) -> OrchestratorResult<Vec<String>> {
        Ok(self.queue.lock().unwrap().iter().cloned().collect())
    }

    async fn queued_count(&self) -> OrchestratorResult<u64> {
        Ok(self.queue.lock().unwrap().len() as u64)
    }

    async fn remove_from_queue(&self, execution_id: &str) -> OrchestratorResult<()> {
        self.queue.lock().unwrap().retain(|id| id != execution_id);
        Ok(())
    }
}

/// 计数任务：记录调用次数，可配置固定失败和执行时长
pub struct CountingTask {
    pub calls: Arc<AtomicU32>,
    pub fail: bool,
    pub delay: Duration,
}

impl CountingTask {
    pub fn succeeding(calls: Arc<AtomicU32>) -> Self {
        Self {
            calls,
            fail: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(calls: Arc<AtomicU32>) -> Self {
        Self {
            calls,
            fail: true,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl TaskFunction for CountingTask {
    async fn run(
        &self,
        _cancel: CancellationToken,
        _data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            Err(OrchestratorError::Internal("模拟任务失败".to_string()))
        } else {
            Ok(())
        }
    }
}

/// 并发跟踪任务：记录同时在执行的实例数量的峰值
pub struct TrackingTask {
    pub current: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
    pub delay: Duration,
}

#[async_trait]
impl TaskFunction for TrackingTask {
    async fn run(
        &self,
        _cancel: CancellationToken,
        _data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 顺序记录任务：把输入数据中的标记按执行顺序收集起来
pub struct RecordingTask {
    pub order: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TaskFunction for RecordingTask {
    async fn run(
        &self,
        _cancel: CancellationToken,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()> {
        let marker = data
            .get("marker")
            .and_then(|value| value.as_str())
            .unwrap_or("")
            .to_string();
        self.order.lock().unwrap().push(marker);
        Ok(())
    }
}

pub fn task(id: &str, max_retry: u32, function_name: &str) -> Task {
    Task {
        id: id.to_string(),
        name: format!("{id} task"),
        max_retry,
        function_name: function_name.to_string(),
    }
}

pub fn definition(id: &str, tasks: Vec<Task>) -> JobDefinition {
    JobDefinition {
        id: id.to_string(),
        name: format!("{id} definition"),
        tasks,
    }
}

/// 轮询存储直到执行实例进入终态
pub async fn wait_until_terminal(
    store: &dyn JobStore,
    execution_id: &str,
    timeout: Duration,
) -> JobExecution {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(execution) = store.get_job_execution(execution_id).await {
            if execution.status.is_terminal() {
                return execution;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("执行 {execution_id} 在 {timeout:?} 内未到达终态");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
