use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use orchestrator_core::traits::JobStore;

use crate::runner::JobRunner;

/// 工作池调度器：从队列取出执行ID并在并发上限内派发
///
/// 单个协调循环轮询队列，队列为空时等待固定间隔再试。
/// 计数信号量限制同时执行的作业数量；信号量许可在派发出去的
/// 作业结束时释放，与成败无关。出队先于派发删除队列条目，
/// 同一执行ID任一时刻至多有一个活跃的执行单元。
pub struct QueueScheduler {
    store: Arc<dyn JobStore>,
    runner: Arc<JobRunner>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    poll_interval: Duration,
}

impl QueueScheduler {
    pub fn new(
        store: Arc<dyn JobStore>,
        runner: Arc<JobRunner>,
        max_concurrent: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            runner,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            poll_interval,
        }
    }

    /// 运行协调循环直到收到停止信号
    ///
    /// 停止时只退出本循环，不等待已派发的作业——它们在后台继续
    /// 执行并写入存储。
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "调度循环启动，最大并发 {}，空队列轮询间隔 {:?}",
            self.max_concurrent, self.poll_interval
        );

        loop {
            match shutdown.try_recv() {
                Ok(()) | Err(broadcast::error::TryRecvError::Closed) => break,
                Err(_) => {}
            }

            match self.store.dequeue_execution().await {
                Ok(execution_id) => {
                    let permit = match self.semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        // 信号量只在调度器销毁时关闭
                        Err(_) => break,
                    };

                    let runner = self.runner.clone();
                    tokio::spawn(async move {
                        if let Err(err) = runner
                            .execute_job(&execution_id, CancellationToken::new())
                            .await
                        {
                            error!("执行作业 {} 失败: {}", execution_id, err);
                        }
                        drop(permit);
                    });
                }
                Err(err) if err.is_queue_empty() => {
                    // 队列为空是预期状态，等一个轮询周期再试
                    tokio::select! {
                        _ = shutdown.recv() => break,
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
                Err(err) => {
                    error!("出队失败: {}", err);
                    tokio::select! {
                        _ = shutdown.recv() => break,
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }

        info!("调度循环退出");
    }
}
