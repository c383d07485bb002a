pub mod app;

pub use app::{build_app, form_config, json_config};

use infra::config::AppConfigImpl;
use infra::repository::sql::user::UserRepositoryImpl;
use sea_orm::DatabaseConnection;

/// 应用共享状态
///
/// 数据库句柄在进程启动时显式创建后传入，不使用全局单例。
pub struct AppState {
    pub app_cfg: AppConfigImpl,
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection, app_cfg: AppConfigImpl) -> Self {
        Self { app_cfg, db }
    }

    pub fn user_repository(&self) -> UserRepositoryImpl {
        UserRepositoryImpl::new(self.db.clone())
    }
}
