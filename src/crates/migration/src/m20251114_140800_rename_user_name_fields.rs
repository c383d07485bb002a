use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        rename(manager, "firstName", "first_name").await?;
        rename(manager, "lastName", "last_name").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        rename(manager, "first_name", "firstName").await?;
        rename(manager, "last_name", "lastName").await
    }
}

// A missing source column makes the database reject the statement, so
// re-applying a step fails without touching any rows.
async fn rename(manager: &SchemaManager<'_>, from: &str, to: &str) -> Result<(), DbErr> {
    manager
        .alter_table(
            Table::alter()
                .table(Users::Table)
                .rename_column(Alias::new(from), Alias::new(to))
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "Users")]
    Table,
}
