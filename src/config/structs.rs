use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{IpGeoError, Result};
use crate::geo::{BlankFieldPolicy, DatasetEdition};
use crate::source::HttpSettings;

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、工作线程数、查询路由前缀
/// - dataset: 数据集来源、版本、刷新间隔、HTTP 拉取参数
/// - api: 管理接口令牌与路由前缀
/// - logging: 日志配置
/// - lookup: 查询结果的字段策略
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：IPGEO，分隔符：__
    /// 示例：IPGEO__SERVER__PORT=9999
    ///
    /// 文件不存在时使用默认值；文件或环境变量中有无法解析的键时返回错误，
    /// 不会退回默认值。
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("IPGEO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| IpGeoError::config(format!("Failed to read {}: {}", path, e)))?;

        let config = settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| IpGeoError::config(format!("Invalid configuration in {}: {}", path, e)))?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    #[serde(default = "default_lookup_prefix")]
    pub lookup_prefix: String,
}

/// 数据集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// 启动时加载的数据集 URI（file:// 或 http(s)://）
    #[serde(default = "default_dataset_url")]
    pub url: String,
    /// 刷新时使用的 URI，未设置时沿用 `url`
    #[serde(default)]
    pub update_url: Option<String>,
    /// 摘要校验 URI（MD5 十六进制文本），未设置时每轮都完整下载
    #[serde(default)]
    pub hash_url: Option<String>,
    #[serde(default)]
    pub edition: DatasetEdition,
    /// 刷新间隔（秒），0 表示不刷新
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: u64,
}

impl DatasetConfig {
    pub fn update_url(&self) -> &str {
        self.update_url.as_deref().unwrap_or(&self.url)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            global_timeout: Duration::from_secs(self.download_timeout_secs),
            max_body_bytes: self.max_download_bytes,
        }
    }
}

/// 管理与健康检查接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 为空时禁用管理接口
    #[serde(default)]
    pub admin_token: String,
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 查询配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupConfig {
    /// 空字符串字段视为缺失（absent）还是保留为空（blank）
    #[serde(default)]
    pub blank_fields: BlankFieldPolicy,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_lookup_prefix() -> String {
    "/api/ip-to-cc".to_string()
}

fn default_dataset_url() -> String {
    "http://geolite.maxmind.com/download/geoip/database/GeoLite2-Country-CSV.zip".to_string()
}

fn default_refresh_interval() -> u64 {
    24 * 60 * 60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    300
}

fn default_max_download_bytes() -> u64 {
    512 * 1024 * 1024
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            lookup_prefix: default_lookup_prefix(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: default_dataset_url(),
            update_url: None,
            hash_url: None,
            edition: DatasetEdition::default(),
            refresh_interval_secs: default_refresh_interval(),
            connect_timeout_secs: default_connect_timeout(),
            download_timeout_secs: default_download_timeout(),
            max_download_bytes: default_max_download_bytes(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            admin_prefix: default_admin_prefix(),
            health_prefix: default_health_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
