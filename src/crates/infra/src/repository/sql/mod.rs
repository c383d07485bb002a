//! SeaORM repositories, shared by the SQLite and PostgreSQL backends.

pub mod db_data;
pub mod user;
