//! HTTP(S) 数据源
//!
//! 使用 ureq 同步拉取，放到 spawn_blocking 中执行，避免阻塞 runtime。
//! 连接超时与整体超时保证远端卡死时本轮刷新能及时结束。

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace};
use ureq::Agent;
use url::Url;

use super::{HttpSettings, Source};
use crate::errors::{IpGeoError, Result};

pub struct HttpSource {
    url: Url,
    agent: Agent,
    max_body_bytes: u64,
}

impl HttpSource {
    pub fn new(url: Url, settings: &HttpSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(settings.connect_timeout))
            .timeout_global(Some(settings.global_timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            url,
            agent,
            max_body_bytes: settings.max_body_bytes,
        }
    }

    fn fetch_sync(agent: Agent, url: String, limit: u64) -> Result<Vec<u8>> {
        let resp = agent.get(&url).call()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IpGeoError::source_fetch(format!(
                "GET {} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        let data = resp.into_body().with_config().limit(limit).read_to_vec()?;
        trace!("GET {} returned {} bytes", url, data.len());
        Ok(data)
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn read(&self) -> Result<Bytes> {
        let agent = self.agent.clone();
        let url = self.url.to_string();
        let limit = self.max_body_bytes;

        debug!("Fetching {}", url);
        let data = tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url, limit)).await??;
        Ok(Bytes::from(data))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
