//! 本地文件数据源

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;
use url::Url;

use super::Source;
use crate::errors::{IpGeoError, Result};

pub struct FileSource {
    path: PathBuf,
    uri: String,
}

impl FileSource {
    pub fn from_url(url: &Url) -> Result<Self> {
        let path = url.to_file_path().map_err(|_| {
            IpGeoError::unsupported_scheme(format!("\"{}\" is not a local file path", url))
        })?;
        Ok(Self {
            path,
            uri: url.to_string(),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl Source for FileSource {
    async fn read(&self) -> Result<Bytes> {
        let path = self.path.clone();
        let data = tokio::task::spawn_blocking(move || std::fs::read(&path)).await??;
        trace!("Read {} bytes from {}", data.len(), self.uri);
        Ok(Bytes::from(data))
    }

    fn describe(&self) -> String {
        self.uri.clone()
    }
}
