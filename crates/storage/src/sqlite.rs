use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use orchestrator_core::{
    models::{JobDefinition, JobExecution, JobStatus, TaskStatus},
    traits::JobStore,
    OrchestratorError, OrchestratorResult,
};

/// 基于嵌入式SQLite的持久化存储
///
/// 作业定义、执行实例和FIFO队列各占一张表。队列顺序由
/// 自增的 `seq` 列定义，即插入顺序，与优先级无关。
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 打开（必要时创建）数据库文件并初始化表结构
    pub async fn connect(database_path: impl AsRef<Path>) -> OrchestratorResult<Self> {
        let database_path = database_path.as_ref();
        debug!("打开SQLite数据库: {}", database_path.display());

        // 启用外键约束和WAL模式
        let connect_options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .connect_with(connect_options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// 运行数据库迁移
    async fn run_migrations(pool: &SqlitePool) -> OrchestratorResult<()> {
        debug!("初始化SQLite表结构");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_definitions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                tasks TEXT NOT NULL DEFAULT '[]'
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_executions (
                id TEXT PRIMARY KEY,
                definition_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'QUEUED',
                start_time DATETIME NOT NULL,
                end_time DATETIME,
                data TEXT NOT NULL DEFAULT '{}',
                task_statuses TEXT NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queue (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                execution_id TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_job_executions_status ON job_executions(status)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    fn row_to_execution(row: &sqlx::sqlite::SqliteRow) -> OrchestratorResult<JobExecution> {
        let data: String = row.try_get("data")?;
        let task_statuses: String = row.try_get("task_statuses")?;
        Ok(JobExecution {
            id: row.try_get("id")?,
            definition_id: row.try_get("definition_id")?,
            status: row.try_get("status")?,
            start_time: row.try_get::<DateTime<Utc>, _>("start_time")?,
            end_time: row.try_get::<Option<DateTime<Utc>>, _>("end_time")?,
            data: serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&data)?,
            task_statuses: serde_json::from_str::<HashMap<String, TaskStatus>>(&task_statuses)?,
        })
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn store_job_definition(&self, definition: &JobDefinition) -> OrchestratorResult<()> {
        let tasks = serde_json::to_string(&definition.tasks)?;
        sqlx::query("INSERT OR REPLACE INTO job_definitions (id, name, tasks) VALUES (?1, ?2, ?3)")
            .bind(&definition.id)
            .bind(&definition.name)
            .bind(tasks)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_job_definition(&self, id: &str) -> OrchestratorResult<JobDefinition> {
        let row = sqlx::query("SELECT id, name, tasks FROM job_definitions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::DefinitionNotFound { id: id.to_string() })?;

        let tasks: String = row.try_get("tasks")?;
        Ok(JobDefinition {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            tasks: serde_json::from_str(&tasks)?,
        })
    }

    async fn store_job_execution(&self, execution: &JobExecution) -> OrchestratorResult<()> {
        let data = serde_json::to_string(&execution.data)?;
        let task_statuses = serde_json::to_string(&execution.task_statuses)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO job_executions
                (id, definition_id, status, start_time, end_time, data, task_statuses)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&execution.id)
        .bind(&execution.definition_id)
        .bind(execution.status)
        .bind(execution.start_time)
        .bind(execution.end_time)
        .bind(data)
        .bind(task_statuses)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_job_execution(&self, id: &str) -> OrchestratorResult<JobExecution> {
        let row = sqlx::query(
            r#"
            SELECT id, definition_id, status, start_time, end_time, data, task_statuses
            FROM job_executions WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrchestratorError::ExecutionNotFound { id: id.to_string() })?;

        Self::row_to_execution(&row)
    }

    async fn list_running_executions(&self) -> OrchestratorResult<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM job_executions WHERE status = ?1")
            .bind(JobStatus::Running)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("id").map_err(Into::into))
            .collect()
    }

    async fn enqueue_execution(&self, execution_id: &str) -> OrchestratorResult<()> {
        // 重复入队同一ID是幂等操作
        sqlx::query("INSERT OR IGNORE INTO queue (execution_id) VALUES (?1)")
            .bind(execution_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn dequeue_execution(&self) -> OrchestratorResult<String> {
        // 查询与删除在同一事务内，出队的ID不可能被第二个消费者拿到
        let mut tx = self.pool.begin().await?;

        let head = sqlx::query("SELECT seq, execution_id FROM queue ORDER BY seq ASC LIMIT 1")
            .fetch_optional(&mut *tx)
            .await?;

        let row = match head {
            Some(row) => row,
            None => return Err(OrchestratorError::QueueEmpty),
        };
        let seq: i64 = row.try_get("seq")?;
        let execution_id: String = row.try_get("execution_id")?;

        sqlx::query("DELETE FROM queue WHERE seq = ?1")
            .bind(seq)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(execution_id)
    }

    async fn list_queued_executions(&self) -> OrchestratorResult<Vec<String>> {
        let rows = sqlx::query("SELECT execution_id FROM queue ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("execution_id").map_err(Into::into))
            .collect()
    }

    async fn queued_count(&self) -> OrchestratorResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM queue")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("cnt")?;
        Ok(count as u64)
    }

    async fn remove_from_queue(&self, execution_id: &str) -> OrchestratorResult<()> {
        sqlx::query("DELETE FROM queue WHERE execution_id = ?1")
            .bind(execution_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
