pub mod repository;

pub mod config;
pub use config::{AppConfigImpl, ConfigError, DbMode, PoolConfig, ServerConfig};

pub mod database;
pub use database::{DatabaseConfig, DatabaseTarget};
