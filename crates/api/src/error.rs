use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orchestrator_core::OrchestratorError;
use serde_json::json;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("编排器错误: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Orchestrator(OrchestratorError::DefinitionNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "DEFINITION_NOT_FOUND",
                format!("作业定义 {id} 不存在"),
            ),
            ApiError::Orchestrator(OrchestratorError::ExecutionNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "EXECUTION_NOT_FOUND",
                format!("作业执行 {id} 不存在"),
            ),
            ApiError::Orchestrator(OrchestratorError::FunctionNotRegistered { name }) => (
                StatusCode::BAD_REQUEST,
                "FUNCTION_NOT_REGISTERED",
                format!("任务函数 {name} 未注册"),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            ApiError::Orchestrator(e) => {
                error!("请求处理失败: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "内部服务器错误".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": {
                "code": code,
                "message": message,
            },
            "timestamp": chrono::Utc::now(),
        });

        (status, Json(body)).into_response()
    }
}
