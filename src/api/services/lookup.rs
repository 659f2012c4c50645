use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::trace;

use super::ErrorBody;
use crate::errors::IpGeoError;
use crate::geo::{DatabaseManager, LookupResult};

pub struct LookupService;

impl LookupService {
    /// 查询单个地址
    ///
    /// - 200: 位置记录 JSON，缺失字段省略
    /// - 400: 地址既不是 IPv4 也不是 IPv6
    /// - 404: 地址合法但不在任何网段内
    pub async fn lookup(
        path: web::Path<String>,
        manager: web::Data<Arc<DatabaseManager>>,
    ) -> impl Responder {
        let address = path.into_inner();
        trace!("Lookup request for {}", address);

        match manager.lookup(&address) {
            LookupResult::Found(record) => HttpResponse::Ok().json(record),
            LookupResult::NotFound => HttpResponse::NotFound()
                .json(ErrorBody::new(format!("no location found for {}", address))),
            LookupResult::InvalidAddress => HttpResponse::BadRequest()
                .json(ErrorBody::new(IpGeoError::invalid_address(address).to_string())),
        }
    }

    pub async fn index() -> impl Responder {
        HttpResponse::Ok().finish()
    }
}

/// 查询路由，挂在 `server.lookup_prefix` 下
pub fn lookup_routes() -> actix_web::Scope {
    web::scope("").route("/{address}", web::get().to(LookupService::lookup))
}
