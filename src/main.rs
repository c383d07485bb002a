use actix_web::{web, HttpServer};
use anyhow::Context;
use infra::config::{AppConfigImpl, LogConfig};
use infra::database;
use log::{error, info};
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use migration::{Migrator, MigratorTrait};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}";

// 日志同时输出到控制台和文件，RUST_LOG 优先于配置里的级别
fn init_logging(log_cfg: &LogConfig) -> anyhow::Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| log_cfg.level.clone());

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&log_cfg.file)
        .with_context(|| format!("failed to open log file {}", log_cfg.file))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build(
            "stdout",
            Box::new(
                ConsoleAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                    .build(),
            ),
        ))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(log_level.parse().unwrap_or(log::LevelFilter::Info)),
        )?;

    log4rs::init_config(config)?;
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match AppConfigImpl::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // 配置不可用时按默认日志设置记录错误
            init_logging(&LogConfig::default())?;
            error!("{}", e);
            return Err(e.into());
        }
    };
    init_logging(&cfg.log)?;

    let db_cfg = match cfg.database() {
        Ok(db_cfg) => db_cfg,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    // 句柄惰性创建，存储不可达不会在这里失败
    let db = match database::connect(&db_cfg).await {
        Ok(db) => db,
        Err(e) => {
            error!("Invalid database configuration: {}", e);
            return Err(e.into());
        }
    };
    if !db_cfg.mode.is_production() {
        database::spawn_connection_check(db.clone(), db_cfg.mode.clone());
    }

    if cfg.auto_migrate {
        match Migrator::up(&db, None).await {
            Ok(()) => info!("Database schema is up to date"),
            // 存储不可达时不退出，后续操作会返回连接错误
            Err(e) => error!("Failed to apply migrations: {}", e),
        }
    }

    let server_cfg = cfg.server();
    let app_state = web::Data::new(server::AppState::new(db.clone(), cfg));

    info!("Server running on port : {}", server_cfg.port);
    HttpServer::new(move || server::build_app(app_state.clone()))
        .bind((server_cfg.host.as_str(), server_cfg.port))?
        .run()
        .await?;

    db.close().await?;
    info!("Database connection closed");
    Ok(())
}
