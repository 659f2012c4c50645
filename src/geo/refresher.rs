//! 定时刷新任务

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::manager::{DatabaseManager, RefreshOutcome};

pub struct RefreshTask;

impl RefreshTask {
    /// 启动后台刷新循环
    ///
    /// 第一次 tick 会被跳过（初始化刚加载过数据）。
    /// 每轮错误只记录日志，旧快照继续提供服务。
    pub fn spawn(manager: Arc<DatabaseManager>, interval: Duration) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            info!("Dataset refresh task started (interval={:?})", interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match manager.refresh_now().await {
                            Ok(RefreshOutcome::Updated { digest }) => {
                                info!("Dataset refreshed (digest={})", digest);
                            }
                            Ok(outcome) => debug!("Dataset refresh skipped: {:?}", outcome),
                            Err(e) => error!("Dataset refresh failed, keeping current snapshot: {}", e),
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Dataset refresh task stopped");
        });

        RefreshHandle { stop_tx, join }
    }
}

pub struct RefreshHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RefreshHandle {
    /// 通知任务停止并等待其退出
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            error!("Refresh task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
