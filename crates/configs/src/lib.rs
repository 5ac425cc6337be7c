use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Where collections are stored on disk.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { prefix: default_prefix() }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_data_dir() -> String { "data".into() }
fn default_prefix() -> String { "/api/vault".into() }
fn default_log_format() -> String { "compact".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Build a config purely from environment variables, used when no config file exists.
pub fn from_env() -> AppConfig {
    from_lookup(|key| std::env::var(key).ok())
}

fn from_lookup<F>(lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = AppConfig::default();
    if let Some(host) = lookup("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    cfg.server.worker_threads = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok());
    if let Some(dir) = lookup("DATA_DIR") {
        cfg.storage.data_dir = dir;
    }
    if let Some(prefix) = lookup("API_PREFIX") {
        cfg.api.prefix = prefix;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        cfg.log.format = format;
    }
    cfg
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    /// Load from the config file if present, otherwise from the environment, then validate.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    /// Like [`AppConfig::load_and_validate`] with an explicit path. Only a missing
    /// file falls back to the environment; an unreadable or malformed file is an error.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => from_env(),
            Err(e) => return Err(e.context(format!("failed to load config from {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.api.normalize()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir is empty; set it in config.toml or DATA_DIR"));
        }
        Ok(())
    }
}

impl ApiConfig {
    fn normalize(&mut self) -> Result<()> {
        if !self.prefix.starts_with('/') {
            return Err(anyhow!("api.prefix must start with '/'"));
        }
        // 去掉末尾的 '/'，便于与路由拼接
        while self.prefix.len() > 1 && self.prefix.ends_with('/') {
            self.prefix.pop();
        }
        Ok(())
    }
}
