use axum::extract::State;

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};
use orchestrator_core::models::SystemState;

/// 查询系统整体状态：执行中的作业快照与排队情况
pub async fn get_system_state(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<SystemState>> {
    let system_state = state.orchestrator.get_system_state().await?;
    Ok(ApiResponse::success(system_state))
}
