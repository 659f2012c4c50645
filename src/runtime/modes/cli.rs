//! CLI mode
//!
//! 一次性命令：加载数据集查询地址，或生成示例配置。

use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;
use serde_json::json;

use crate::config::{StaticConfig, get_config};
use crate::errors::IpGeoError;
use crate::geo::LookupResult;
use crate::runtime::lifetime::startup::load_database;

/// 加载一次数据集，逐个输出查询结果（每行一个 JSON）
///
/// 只要有地址不合法或未命中，返回错误以便脚本判断退出码。
pub async fn run_lookup(addresses: &[String], dataset: Option<String>) -> Result<()> {
    let mut config = StaticConfig::clone(&get_config());
    if let Some(url) = dataset {
        config.dataset.url = url;
        config.dataset.update_url = None;
        config.dataset.hash_url = None;
    }

    let manager = load_database(&config).await?;

    let mut misses = 0usize;
    for address in addresses {
        let line = match manager.lookup(address) {
            LookupResult::Found(record) => json!({ "address": address, "location": record }),
            LookupResult::NotFound => {
                misses += 1;
                json!({ "address": address, "error": "not found" })
            }
            LookupResult::InvalidAddress => {
                misses += 1;
                let err = IpGeoError::invalid_address(address.as_str());
                json!({ "address": address, "error": err.to_string() })
            }
        };
        println!("{}", line);
    }

    if misses > 0 {
        bail!("{} of {} addresses could not be resolved", misses, addresses.len());
    }
    Ok(())
}

pub fn run_config_generate(output_path: Option<String>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        bail!("File already exists: {} (use --force to overwrite)", path);
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default()
        .save_to_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}
