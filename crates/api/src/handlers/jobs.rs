use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{error::ApiError, error::ApiResult, response::ApiResponse, routes::AppState};
use orchestrator_core::models::{JobDefinition, JobExecutionState};

/// 注册作业定义
pub async fn register_job_definition(
    State(state): State<AppState>,
    Json(definition): Json<JobDefinition>,
) -> ApiResult<(StatusCode, ApiResponse<()>)> {
    if definition.id.is_empty() {
        return Err(ApiError::BadRequest("作业定义ID不能为空".to_string()));
    }
    if definition.tasks.is_empty() {
        return Err(ApiError::BadRequest("作业定义至少包含一个任务".to_string()));
    }

    state.orchestrator.register_job_definition(&definition).await?;
    info!("通过API注册作业定义: {}", definition.id);

    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message(format!("作业定义 {} 已注册", definition.id)),
    ))
}

/// 触发作业执行，作业被写入持久队列等待调度
pub async fn execute_job(
    State(state): State<AppState>,
    Path(definition_id): Path<String>,
    body: Option<Json<serde_json::Map<String, serde_json::Value>>>,
) -> ApiResult<(StatusCode, ApiResponse<serde_json::Value>)> {
    let data = body.map(|Json(map)| map).unwrap_or_default();

    let execution_id = state.orchestrator.enqueue_job(&definition_id, data).await?;

    Ok((
        StatusCode::ACCEPTED,
        ApiResponse::success(json!({ "executionID": execution_id })),
    ))
}

/// 查询作业执行状态
pub async fn get_job_state(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> ApiResult<ApiResponse<JobExecutionState>> {
    let job_state = state
        .orchestrator
        .get_job_execution_state(&execution_id)
        .await?;
    Ok(ApiResponse::success(job_state))
}
