use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::RouteConfig;
use crate::config::{DatasetConfig, StaticConfig, get_config};
use crate::geo::{
    DatabaseManager, DatasetLayout, DatasetLoader, DatasetSources, RefreshHandle, RefreshTask,
};
use crate::source::{Source, create_source};

pub struct StartupContext {
    pub manager: Arc<DatabaseManager>,
    pub refresher: Option<RefreshHandle>,
    pub route_config: RouteConfig,
}

/// 根据配置创建初始数据源与刷新数据源
///
/// `update_url` 未设置或与 `url` 相同时复用同一个数据源。
pub fn build_sources(dataset: &DatasetConfig) -> Result<(Arc<dyn Source>, DatasetSources)> {
    let settings = dataset.http_settings();

    let initial = create_source(&dataset.url, &settings)
        .with_context(|| format!("Invalid dataset.url '{}'", dataset.url))?;

    let update = if dataset.update_url() == dataset.url {
        initial.clone()
    } else {
        create_source(dataset.update_url(), &settings)
            .with_context(|| format!("Invalid dataset.update_url '{}'", dataset.update_url()))?
    };

    let hash_check = dataset
        .hash_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .map(|url| {
            create_source(url, &settings)
                .with_context(|| format!("Invalid dataset.hash_url '{}'", url))
        })
        .transpose()?;

    Ok((initial, DatasetSources { update, hash_check }))
}

pub fn build_loader(config: &StaticConfig) -> DatasetLoader {
    DatasetLoader::new(
        DatasetLayout::for_edition(config.dataset.edition),
        config.lookup.blank_fields,
    )
}

/// 加载首份快照，失败即启动失败
pub async fn load_database(config: &StaticConfig) -> Result<Arc<DatabaseManager>> {
    let (initial, sources) = build_sources(&config.dataset)?;
    let loader = build_loader(config);

    let manager = DatabaseManager::initialize(initial, sources, loader)
        .await
        .context("Failed to load initial dataset")?;
    Ok(Arc::new(manager))
}

/// 准备服务器启动的上下文
/// 包括数据库快照、刷新任务和路由配置
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let manager = load_database(&config).await?;

    let refresher = match config.dataset.refresh_interval() {
        Some(interval) => {
            if manager.sources().hash_check.is_none() {
                debug!("No dataset.hash_url configured, every refresh downloads the full dataset");
            }
            Some(RefreshTask::spawn(manager.clone(), interval))
        }
        None => {
            warn!("dataset.refresh_interval_secs is 0, dataset refresh disabled");
            None
        }
    };

    let route_config = RouteConfig::from_config(&config);
    if route_config.admin_token.is_empty() {
        info!("Admin API is disabled (api.admin_token not set)");
    } else {
        info!("Admin API available at: {}", route_config.admin_prefix);
    }

    info!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );

    Ok(StartupContext {
        manager,
        refresher,
        route_config,
    })
}
