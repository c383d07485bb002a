use crate::database::{DatabaseConfig, DatabaseTarget};
use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::fmt::{self, Display};
use std::time::Duration;
use thiserror::Error;

/// 开发环境下 SQLite 文件的默认位置
const DEFAULT_DB_STORAGE: &str = "./database.sqlite";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("DATABASE_URL is required for {mode} environment")]
    MissingDatabaseUrl { mode: DbMode },
}

/// 运行环境，取自 `NODE_ENV`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbMode {
    /// 内存 SQLite，进程结束即丢弃
    Test,
    /// 本地 SQLite 文件
    Development,
    /// PostgreSQL，必须提供连接串
    Production,
    /// 其它名字的环境，同样走 PostgreSQL
    Other(String),
}

impl DbMode {
    pub fn parse(value: &str) -> DbMode {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" => DbMode::Test,
            "" | "development" => DbMode::Development,
            "production" => DbMode::Production,
            other => DbMode::Other(other.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        *self == DbMode::Production
    }
}

impl Display for DbMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbMode::Test => f.write_str("test"),
            DbMode::Development => f.write_str("development"),
            DbMode::Production => f.write_str("production"),
            DbMode::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    node_env: String,
    db_storage: String,
    database_url: String,
    host: String,
    port: u16,
    auto_migrate: bool,
    log_level: String,
    log_file: String,
    /// 连接池配置
    pool: RawPoolConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            node_env: "development".to_string(),
            db_storage: DEFAULT_DB_STORAGE.to_string(),
            database_url: "".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            auto_migrate: true,
            log_level: "info".to_string(),
            log_file: "app.log".to_string(),
            pool: RawPoolConfig::default(),
        }
    }
}

/// 连接池配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawPoolConfig {
    max_connections: u32,
    min_connections: u32,
    acquire_timeout_secs: u64,
    idle_timeout_secs: u64,
}

impl Default for RawPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 10,
        }
    }
}

/// 连接池配置
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// 等待空闲连接的最长时间，超时后操作以连接错误失败
    pub acquire_timeout: Duration,
    /// 空闲连接被回收前的存活时间
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        RawPoolConfig::default().into()
    }
}

impl From<RawPoolConfig> for PoolConfig {
    fn from(raw: RawPoolConfig) -> Self {
        PoolConfig {
            max_connections: raw.max_connections,
            min_connections: raw.min_connections,
            acquire_timeout: Duration::from_secs(raw.acquire_timeout_secs),
            idle_timeout: Duration::from_secs(raw.idle_timeout_secs),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub level: String,
    pub file: String,
}

/// 配置加载失败时使用的日志设置
impl Default for LogConfig {
    fn default() -> Self {
        AppConfigImpl::default().log
    }
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    pub mode: DbMode,
    pub db_storage: String,
    pub database_url: String,
    pub auto_migrate: bool,
    pub pool: PoolConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        AppConfigImpl {
            mode: DbMode::parse(&data.node_env),
            db_storage: data.db_storage,
            database_url: data.database_url,
            auto_migrate: data.auto_migrate,
            pool: data.pool.into(),
            server: ServerConfig {
                host: data.host,
                port: data.port,
            },
            log: LogConfig {
                level: data.log_level,
                file: data.log_file,
            },
        }
    }

    /// 加载顺序：`.env` → `config.toml` → 环境变量（`NODE_ENV`、`PORT` 等）→ `APP__` 前缀的嵌套覆盖
    pub fn load() -> Result<AppConfigImpl, ConfigError> {
        dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default().try_parsing(true))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<AppConfigImpl, ConfigError> {
        let raw: RawConfig = config.try_deserialize()?; // serde 自动填充默认值
        Ok(AppConfigImpl::new(raw))
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone()
    }

    /// 解析数据库目标；生产环境缺少 `DATABASE_URL` 时返回错误，由调用方决定是否退出
    pub fn database(&self) -> Result<DatabaseConfig, ConfigError> {
        let target = DatabaseTarget::resolve(&self.mode, &self.db_storage, &self.database_url)?;
        Ok(DatabaseConfig {
            mode: self.mode.clone(),
            target,
            pool: self.pool.clone(),
        })
    }
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        AppConfigImpl::new(RawConfig::default())
    }
}
