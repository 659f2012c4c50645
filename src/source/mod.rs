//! 数据源
//!
//! 统一的字节读取接口，按 URI scheme 在构造时选定实现：
//! - `file://` → [`FileSource`]
//! - `http://` / `https://` → [`HttpSource`]

mod file;
mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::errors::{IpGeoError, Result};

pub use file::FileSource;
pub use http::HttpSource;

/// 数据源 trait
#[async_trait]
pub trait Source: Send + Sync {
    /// 读取完整内容
    async fn read(&self) -> Result<Bytes>;

    /// 日志用描述（通常是 URI）
    fn describe(&self) -> String;
}

/// HTTP 拉取参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub global_timeout: Duration,
    pub max_body_bytes: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            global_timeout: Duration::from_secs(300),
            max_body_bytes: 512 * 1024 * 1024,
        }
    }
}

/// 根据 URI 创建数据源，不支持的 scheme 直接报错
pub fn create_source(uri: &str, settings: &HttpSettings) -> Result<Arc<dyn Source>> {
    let url = Url::parse(uri)
        .map_err(|e| IpGeoError::unsupported_scheme(format!("invalid source URI \"{}\": {}", uri, e)))?;

    match url.scheme() {
        "file" => Ok(Arc::new(FileSource::from_url(&url)?)),
        "http" | "https" => Ok(Arc::new(HttpSource::new(url, settings))),
        other => Err(IpGeoError::unsupported_scheme(format!(
            "unknown scheme \"{}\" in \"{}\"",
            other, uri
        ))),
    }
}
