//! Server mode
//!
//! 加载首份快照、启动刷新任务，然后运行 HTTP 服务直到收到关闭信号。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::{
    self,
    middleware::{RequestIdMiddleware, TimingMiddleware},
    services::AppStartTime,
};
use crate::config::get_config;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let config = get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let manager = startup.manager.clone();
    let route = startup.route_config.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware) // 内层，日志落在 request span 中
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache")))
            .app_data(web::Data::new(manager.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(|cfg| api::configure(cfg, &route))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .disable_signals()
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();
    let handle = server.handle();

    // 收到关闭信号后先停刷新任务，再让 HTTP 服务优雅退出
    let refresher = startup.refresher;
    tokio::spawn(async move {
        lifetime::shutdown::listen_for_shutdown(refresher).await;
        handle.stop(true).await;
    });

    server.await?;
    warn!("Graceful shutdown: all tasks completed");
    Ok(())
}
