use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use super::HealthResponse;
use crate::geo::DatabaseManager;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// Health Service
///
/// 管理器只有在首份快照加载成功后才存在，因此服务在线即代表可查询；
/// 完整检查额外报告当前快照的摘要、加载时间与规模。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        manager: web::Data<Arc<DatabaseManager>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let snapshot = manager.snapshot();
        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        let health_data = HealthResponse {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
            uptime: uptime_seconds,
            dataset: snapshot.stats(),
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        debug!(
            "Health check completed in {:?}, digest: {}, uptime: {}s",
            start_time.elapsed(),
            health_data.dataset.digest,
            uptime_seconds
        );

        HttpResponse::Ok().json(health_data)
    }

    // 就绪检查，只返回 200 状态码
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
