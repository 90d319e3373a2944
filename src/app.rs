use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

use orchestrator_api::create_app;
use orchestrator_engine::Orchestrator;
use orchestrator_storage::SqliteJobStore;

use crate::config::AppConfig;
use crate::{definitions, functions};

/// 主应用程序：装配存储、编排引擎与API服务器
pub struct Application {
    config: AppConfig,
    orchestrator: Arc<Orchestrator>,
    router: Router,
}

impl Application {
    /// 创建应用实例
    ///
    /// 打开数据库、注册内置任务函数并启动编排引擎，
    /// 引擎启动时先恢复上次中断的作业再开始调度。
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化数据库: {}", config.database.path);
        let store = Arc::new(
            SqliteJobStore::connect(&config.database.path)
                .await
                .with_context(|| format!("初始化数据库失败: {}", config.database.path))?,
        );

        let registry = Arc::new(functions::builtin_registry());
        info!("已注册 {} 个内置任务函数", registry.len());

        let orchestrator = Orchestrator::start(store, registry, config.engine_config())
            .await
            .context("启动编排引擎失败")?;

        if let Some(dir) = &config.definitions.dir {
            let loaded = definitions::load_job_definitions(&orchestrator, dir).await?;
            info!("从 {dir} 加载了 {loaded} 个作业定义");
        }

        let router = create_app(Arc::clone(&orchestrator));

        Ok(Self {
            config,
            orchestrator,
            router,
        })
    }

    /// 运行HTTP服务器直到收到关闭信号，随后停止编排引擎
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;
        info!("API服务器监听于 {}", self.config.api.bind_address);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .context("HTTP服务器运行失败")?;

        info!("HTTP服务器已停止，正在停止编排引擎");
        self.orchestrator.shutdown().await;

        Ok(())
    }
}
