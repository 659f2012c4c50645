//! 数据库管理器
//!
//! 持有唯一的已发布快照，负责初始化与刷新：
//! 1. 若配置了校验源，先拉取摘要文本，与上次一致则跳过本轮
//! 2. 拉取完整数据集并计算摘要，与上次一致则跳过
//! 3. 解析成功后原子替换快照并记录新摘要
//!
//! 读者通过 `ArcSwap::load` 拿到快照引用后即可无锁查询，
//! 刷新失败时旧快照保持不变。

use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::database::{LookupResult, Snapshot};
use super::digest::ContentDigest;
use super::loader::DatasetLoader;
use crate::errors::Result;
use crate::source::Source;

/// 刷新使用的数据源
#[derive(Clone)]
pub struct DatasetSources {
    /// 完整数据集
    pub update: Arc<dyn Source>,
    /// 可选的摘要校验源，内容为十六进制 MD5
    pub hash_check: Option<Arc<dyn Source>>,
}

/// 单轮刷新的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// 校验源摘要与当前一致，未下载数据集
    UnchangedByHashCheck,
    /// 数据集字节摘要与当前一致，未重新解析
    UnchangedByContent,
    /// 已发布新快照
    Updated { digest: ContentDigest },
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }
}

pub struct DatabaseManager {
    current: ArcSwap<Snapshot>,
    sources: DatasetSources,
    loader: DatasetLoader,
    // 串行化写者，同时持有最近一次发布的摘要
    last_digest: Mutex<ContentDigest>,
}

impl DatabaseManager {
    /// 从初始数据源加载第一份快照
    ///
    /// 任何失败都直接返回，调用方应视为启动失败。
    pub async fn initialize(
        initial: Arc<dyn Source>,
        sources: DatasetSources,
        loader: DatasetLoader,
    ) -> Result<Self> {
        info!("Loading initial dataset from {}", initial.describe());

        let bytes = initial.read().await?;
        let digest = ContentDigest::of(&bytes);
        let snapshot = Self::build_snapshot(&loader, bytes, digest).await?;

        info!(
            "Initial dataset loaded: digest={}, ipv4={}, ipv6={}, locations={}",
            digest,
            snapshot.database().ipv4().len(),
            snapshot.database().ipv6().len(),
            snapshot.database().locations().len()
        );

        Ok(Self {
            current: ArcSwap::from_pointee(snapshot),
            sources,
            loader,
            last_digest: Mutex::new(digest),
        })
    }

    /// 执行一轮刷新
    ///
    /// 出错时不触碰已发布快照，错误交给调用方记录。
    pub async fn refresh_now(&self) -> Result<RefreshOutcome> {
        let mut last_digest = self.last_digest.lock().await;

        if let Some(hash_check) = &self.sources.hash_check {
            match hash_check.read().await {
                Ok(body) => {
                    let text = String::from_utf8_lossy(&body);
                    if last_digest.matches_hex(&text) {
                        debug!("Hash check {} matches current digest", hash_check.describe());
                        return Ok(RefreshOutcome::UnchangedByHashCheck);
                    }
                }
                Err(e) => {
                    // 校验源只是预检，失败时退回完整下载
                    warn!(
                        "Hash check {} failed, falling back to full download: {}",
                        hash_check.describe(),
                        e
                    );
                }
            }
        }

        let bytes = self.sources.update.read().await?;
        let digest = ContentDigest::of(&bytes);
        if digest == *last_digest {
            debug!("Dataset content unchanged (digest={})", digest);
            return Ok(RefreshOutcome::UnchangedByContent);
        }

        let snapshot = Self::build_snapshot(&self.loader, bytes, digest).await?;
        self.current.store(Arc::new(snapshot));
        *last_digest = digest;

        info!("Published new dataset snapshot (digest={})", digest);
        Ok(RefreshOutcome::Updated { digest })
    }

    /// 在当前快照上查询
    pub fn lookup(&self, text: &str) -> LookupResult {
        self.current.load().lookup(text).cloned()
    }

    /// 当前快照（可用于比较身份或读取统计）
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn sources(&self) -> &DatasetSources {
        &self.sources
    }

    /// 解析是 CPU 密集操作，放到阻塞线程池执行
    async fn build_snapshot(
        loader: &DatasetLoader,
        bytes: Bytes,
        digest: ContentDigest,
    ) -> Result<Snapshot> {
        let loader = loader.clone();
        let database = tokio::task::spawn_blocking(move || loader.load(&bytes)).await??;
        Ok(Snapshot::new(database, digest))
    }
}
