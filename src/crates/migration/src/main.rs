use env_logger::Env;
use sea_orm_migration::prelude::*;

// Reads DATABASE_URL (or -u) like any SeaORM migration CLI, e.g.
// `DATABASE_URL=sqlite://./database.sqlite?mode=rwc cargo run -p migration -- up`
#[async_std::main]
async fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info,sqlx=warn"));
    cli::run_cli(migration::Migrator).await;
}
