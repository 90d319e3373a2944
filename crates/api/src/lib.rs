//! # Orchestrator API
//!
//! 作业编排引擎的REST API服务模块，基于Axum框架构建。
//!
//! ## API 端点
//!
//! - `POST /job-definitions` - 注册作业定义
//! - `POST /jobs/{id}/execute` - 触发作业执行（入队）
//! - `GET /jobs/{id}/state` - 查询作业执行状态
//! - `GET /system/state` - 查询系统整体状态
//! - `GET /health` - 健康检查
//!
//! ## 使用示例
//!
//! ```bash
//! # 注册作业定义
//! curl -X POST http://localhost:8080/job-definitions \
//!   -H "Content-Type: application/json" \
//!   -d '{
//!     "id": "daily-etl",
//!     "name": "每日数据处理",
//!     "tasks": [
//!       {"id": "extract", "name": "抽取", "maxRetry": 2, "functionName": "extractFunction"}
//!     ]
//!   }'
//!
//! # 触发执行
//! curl -X POST http://localhost:8080/jobs/daily-etl/execute \
//!   -H "Content-Type: application/json" -d '{"date": "2026-01-01"}'
//!
//! # 查询执行状态
//! curl http://localhost:8080/jobs/exec-1700000000000000000/state
//! ```

pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use orchestrator_engine::Orchestrator;
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(orchestrator: Arc<Orchestrator>) -> Router {
    let state = AppState { orchestrator };
    create_routes(state).layer(TraceLayer::new_for_http())
}
