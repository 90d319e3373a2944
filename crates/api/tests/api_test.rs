//! API集成测试：真实引擎 + SQLite 存储上的端到端请求

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use orchestrator_api::create_app;
use orchestrator_core::{OrchestratorResult, TaskFunction};
use orchestrator_engine::{EngineConfig, Orchestrator, TaskRegistry};
use orchestrator_storage::SqliteJobStore;

struct NoopTask;

#[async_trait::async_trait]
impl TaskFunction for NoopTask {
    async fn run(
        &self,
        _cancel: CancellationToken,
        _data: &serde_json::Map<String, serde_json::Value>,
    ) -> OrchestratorResult<()> {
        Ok(())
    }
}

async fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(
        SqliteJobStore::connect(dir.path().join("jobs.db"))
            .await
            .unwrap(),
    );

    let mut registry = TaskRegistry::new();
    registry.register("noopFunction", Arc::new(NoopTask));

    let orchestrator = Orchestrator::start(
        store,
        Arc::new(registry),
        EngineConfig {
            max_concurrent: 2,
            poll_interval: Duration::from_millis(20),
        },
    )
    .await
    .unwrap();

    (create_app(orchestrator), dir)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

const ETL_DEFINITION: &str = r#"{
    "id": "daily-etl",
    "name": "每日数据处理",
    "tasks": [
        {"id": "extract", "name": "抽取", "maxRetry": 1, "functionName": "noopFunction"},
        {"id": "load", "name": "装载", "maxRetry": 0, "functionName": "noopFunction"}
    ]
}"#;

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (app, _dir) = test_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_definition_returns_created() {
    let (app, _dir) = test_app().await;

    let response = app
        .oneshot(post_json("/job-definitions", ETL_DEFINITION))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn register_definition_with_unknown_function_is_rejected() {
    let (app, _dir) = test_app().await;

    let definition = r#"{
        "id": "broken",
        "name": "缺失函数",
        "tasks": [{"id": "t1", "name": "t1", "maxRetry": 0, "functionName": "ghostFunction"}]
    }"#;
    let response = app
        .oneshot(post_json("/job-definitions", definition))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FUNCTION_NOT_REGISTERED");
}

#[tokio::test]
async fn register_definition_without_tasks_is_rejected() {
    let (app, _dir) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/job-definitions",
            r#"{"id": "empty", "name": "空定义", "tasks": []}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn execute_unknown_definition_is_not_found() {
    let (app, _dir) = test_app().await;

    let response = app
        .oneshot(post_json("/jobs/ghost/execute", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DEFINITION_NOT_FOUND");
}

#[tokio::test]
async fn execute_returns_accepted_and_state_becomes_terminal() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/job-definitions", ETL_DEFINITION))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json("/jobs/daily-etl/execute", r#"{"date": "2026-01-01"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = body_json(response).await;
    let execution_id = body["data"]["executionID"].as_str().unwrap().to_string();
    assert!(execution_id.starts_with("exec-"));

    // 轮询状态接口直到作业完成
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let response = app
            .clone()
            .oneshot(get(&format!("/jobs/{execution_id}/state")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        if body["data"]["status"] == "COMPLETED" {
            let tasks = body["data"]["tasks"].as_array().unwrap();
            assert_eq!(tasks.len(), 2);
            assert!(tasks.iter().all(|t| t["status"] == "COMPLETED"));
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "作业未在限期内完成");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn execute_without_body_uses_empty_data() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/job-definitions", ETL_DEFINITION))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs/daily-etl/execute")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn state_of_unknown_execution_is_not_found() {
    let (app, _dir) = test_app().await;

    let response = app.oneshot(get("/jobs/exec-404/state")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "EXECUTION_NOT_FOUND");
}

#[tokio::test]
async fn system_state_endpoint_reports_queue() {
    let (app, _dir) = test_app().await;

    let response = app.oneshot(get("/system/state")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["queuedCount"], 0);
    assert!(body["data"]["activeJobs"].as_array().unwrap().is_empty());
}
