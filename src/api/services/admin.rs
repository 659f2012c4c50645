use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{error, info};

use super::{ErrorBody, RefreshResponse, outcome_label};
use crate::geo::DatabaseManager;

pub struct AdminService;

impl AdminService {
    /// 立即执行一轮刷新
    ///
    /// 失败时返回 502，已发布的快照保持不变。
    pub async fn refresh(manager: web::Data<Arc<DatabaseManager>>) -> impl Responder {
        info!("Manual dataset refresh requested");

        match manager.refresh_now().await {
            Ok(outcome) => {
                let snapshot = manager.snapshot();
                HttpResponse::Ok().json(RefreshResponse {
                    outcome: outcome_label(&outcome),
                    digest: snapshot.digest().to_hex(),
                    loaded_at: snapshot.loaded_at().to_rfc3339(),
                })
            }
            Err(e) => {
                error!("Manual dataset refresh failed: {}", e);
                HttpResponse::BadGateway()
                    .json(ErrorBody::new(format!("{}: {}", e.code(), e.message())))
            }
        }
    }
}

/// Admin 路由配置
pub fn admin_routes() -> actix_web::Scope {
    web::scope("").route("/refresh", web::post().to(AdminService::refresh))
}
