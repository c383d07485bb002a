pub use sea_orm_migration::prelude::*;

mod m20251101_000001_create_users_table;
mod m20251114_140800_rename_user_name_fields;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_users_table::Migration),
            Box::new(m20251114_140800_rename_user_name_fields::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{Database, DatabaseConnection};

    async fn memory_db() -> DatabaseConnection {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    async fn columns(db: &DatabaseConnection) -> Vec<(&'static str, bool)> {
        let manager = SchemaManager::new(db);
        let mut out = Vec::new();
        for name in ["firstName", "lastName", "first_name", "last_name"] {
            out.push((name, manager.has_column("Users", name).await.unwrap()));
        }
        out
    }

    #[tokio::test]
    async fn test_up_creates_table_with_snake_case_names() {
        let db = memory_db().await;
        Migrator::up(&db, None).await.unwrap();

        let manager = SchemaManager::new(&db);
        assert!(manager.has_table("Users").await.unwrap());
        for name in ["id", "email", "password", "isActive", "createdAt", "updatedAt"] {
            assert!(manager.has_column("Users", name).await.unwrap(), "missing {name}");
        }
        assert_eq!(
            columns(&db).await,
            vec![
                ("firstName", false),
                ("lastName", false),
                ("first_name", true),
                ("last_name", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_rename_down_restores_camel_case() {
        let db = memory_db().await;
        Migrator::up(&db, None).await.unwrap();
        Migrator::down(&db, Some(1)).await.unwrap();

        assert_eq!(
            columns(&db).await,
            vec![
                ("firstName", true),
                ("lastName", true),
                ("first_name", false),
                ("last_name", false),
            ]
        );
        assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 1);

        Migrator::up(&db, None).await.unwrap();
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_twice_fails_cleanly() {
        let db = memory_db().await;
        Migrator::up(&db, None).await.unwrap();

        let manager = SchemaManager::new(&db);
        let again = m20251114_140800_rename_user_name_fields::Migration
            .up(&manager)
            .await;
        assert!(again.is_err());
        assert_eq!(
            columns(&db).await,
            vec![
                ("firstName", false),
                ("lastName", false),
                ("first_name", true),
                ("last_name", true),
            ]
        );
    }
}
