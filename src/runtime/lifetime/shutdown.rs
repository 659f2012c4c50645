use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::geo::RefreshHandle;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C，然后在超时内停止刷新任务
pub async fn listen_for_shutdown(refresher: Option<RefreshHandle>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping background tasks...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    let Some(refresher) = refresher else {
        return;
    };

    // 刷新任务可能正在下载数据集，超时后直接放弃
    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), refresher.shutdown()).await {
        Ok(()) => info!("Refresh task stopped"),
        Err(_) => error!(
            "Refresh task did not stop within {} seconds, abandoning it",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
