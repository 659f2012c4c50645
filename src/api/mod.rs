//! HTTP 接口
//!
//! - `middleware`: 请求 ID、计时、管理接口认证
//! - `services`: 查询、健康检查、管理接口

pub mod middleware;
pub mod services;

use actix_web::web;

use crate::config::StaticConfig;
use middleware::AdminAuth;
use services::{LookupService, admin_routes, health_routes, lookup_routes};

/// 路由前缀与管理令牌
#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub lookup_prefix: String,
    pub health_prefix: String,
    pub admin_prefix: String,
    pub admin_token: String,
}

impl RouteConfig {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            lookup_prefix: config.server.lookup_prefix.clone(),
            health_prefix: config.api.health_prefix.clone(),
            admin_prefix: config.api.admin_prefix.clone(),
            admin_token: config.api.admin_token.clone(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self::from_config(&StaticConfig::default())
    }
}

/// 注册全部路由
///
/// 调用方负责提供 `web::Data<Arc<DatabaseManager>>` 与 `web::Data<AppStartTime>`。
pub fn configure(cfg: &mut web::ServiceConfig, route: &RouteConfig) {
    cfg.service(
        web::scope(&route.admin_prefix)
            .wrap(AdminAuth::new(route.admin_token.as_str()))
            .service(admin_routes()),
    )
    .service(web::scope(&route.health_prefix).service(health_routes()))
    .service(web::scope(&route.lookup_prefix).service(lookup_routes()))
    .route("/", web::get().to(LookupService::index));
}
