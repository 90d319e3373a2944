//! 内置示例任务函数
//!
//! 每个函数模拟一段耗时工作，真实部署中替换为实际业务逻辑。
//! 任务函数在休眠期间响应取消信号。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use orchestrator_core::{OrchestratorError, OrchestratorResult, TaskFunction};
use orchestrator_engine::TaskRegistry;

/// 固定时长的模拟任务
struct SimulatedTask {
    label: &'static str,
    duration: Duration,
}

#[async_trait]
impl TaskFunction for SimulatedTask {
    async fn run(
        &self,
        cancel: CancellationToken,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()> {
        info!("执行{}, 输入数据: {}", self.label, serde_json::Value::Object(data.clone()));

        tokio::select! {
            _ = tokio::time::sleep(self.duration) => Ok(()),
            _ = cancel.cancelled() => Err(OrchestratorError::Cancelled),
        }
    }
}

/// 构建内置任务函数注册表
pub fn builtin_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.register(
        "task1Function",
        Arc::new(SimulatedTask {
            label: "任务1",
            duration: Duration::from_secs(10),
        }),
    );
    registry.register(
        "task2Function",
        Arc::new(SimulatedTask {
            label: "任务2",
            duration: Duration::from_secs(8),
        }),
    );
    registry.register(
        "task3Function",
        Arc::new(SimulatedTask {
            label: "任务3",
            duration: Duration::from_secs(5),
        }),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_contains_sample_functions() {
        let registry = builtin_registry();
        assert!(registry.contains("task1Function"));
        assert!(registry.contains("task2Function"));
        assert!(registry.contains("task3Function"));
    }

    #[tokio::test]
    async fn simulated_task_respects_cancellation() {
        let task = SimulatedTask {
            label: "测试任务",
            duration: Duration::from_secs(60),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = task.run(cancel, &serde_json::Map::new()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Cancelled));
    }
}
