//! 从目录批量加载作业定义
//!
//! 读取目录下所有 `*.json` 文件，解析为 `JobDefinition` 并注册到编排器。
//! 定义引用了未注册的任务函数时加载失败。

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use orchestrator_core::models::JobDefinition;
use orchestrator_engine::Orchestrator;

pub async fn load_job_definitions(
    orchestrator: &Arc<Orchestrator>,
    dir: impl AsRef<Path>,
) -> Result<usize> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("读取作业定义目录失败: {}", dir.display()))?;

    let mut loaded = 0;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("读取作业定义文件失败: {}", path.display()))?;
        let definition: JobDefinition = serde_json::from_str(&content)
            .with_context(|| format!("解析作业定义失败: {}", path.display()))?;

        orchestrator
            .register_job_definition(&definition)
            .await
            .with_context(|| format!("注册作业定义失败: {}", definition.id))?;

        info!("加载作业定义: {} ({})", definition.id, path.display());
        loaded += 1;
    }

    Ok(loaded)
}
