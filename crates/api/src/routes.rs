use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    health::health_check,
    jobs::{execute_job, get_job_state, register_job_definition},
    system::get_system_state,
};
use orchestrator_engine::Orchestrator;

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 作业管理API
        .route("/job-definitions", post(register_job_definition))
        .route("/jobs/{id}/execute", post(execute_job))
        .route("/jobs/{id}/state", get(get_job_state))
        // 系统监控API
        .route("/system/state", get(get_system_state))
        .with_state(state)
}
