use super::db_data::user::{ActiveModel, Column, Entity};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::user::{NewUser, User, UserChanges, UserError, UserFilter};
use domain::value::{Email, UserId};
use log::debug;
use sea_orm::*;

#[derive(Clone)]
pub struct UserRepositoryImpl {
    db: DatabaseConnection,
}

impl UserRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// 将 SeaORM 错误归类为领域错误；唯一约束冲突只可能来自 email 列
fn map_db_err(err: DbErr, email: Option<&str>) -> UserError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return UserError::DuplicateEmail(email.unwrap_or_default().to_string());
    }
    match err {
        DbErr::Conn(e) => UserError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => UserError::Connection(e.to_string()),
        e => UserError::DbErr(e.to_string()),
    }
}

fn condition(filter: &UserFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(id) = filter.id {
        cond = cond.add(Column::Id.eq(id.as_i32()));
    }
    if let Some(email) = &filter.email {
        cond = cond.add(Column::Email.eq(email.as_str()));
    }
    if let Some(pattern) = &filter.email_like {
        cond = cond.add(Column::Email.like(pattern.as_str()));
    }
    if let Some(is_active) = filter.is_active {
        cond = cond.add(Column::IsActive.eq(is_active));
    }
    if let Some(first_name) = &filter.first_name {
        cond = cond.add(Column::FirstName.eq(first_name.as_str()));
    }
    if let Some(last_name) = &filter.last_name {
        cond = cond.add(Column::LastName.eq(last_name.as_str()));
    }
    cond
}

fn new_active_model(new_user: NewUser, email: Email, at: NaiveDateTime) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        email: Set(email.into_inner()),
        password: Set(new_user.password),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        is_active: Set(new_user.is_active.unwrap_or(true)),
        created_at: Set(at),
        updated_at: Set(at),
    }
}

/// 只写入给出的字段，`updated_at` 总是刷新；`id`、`created_at` 保持 NotSet
fn changes_active_model(changes: UserChanges, at: NaiveDateTime) -> ActiveModel {
    let mut active_model = ActiveModel {
        updated_at: Set(at),
        ..Default::default()
    };
    if let Some(email) = changes.email {
        active_model.email = Set(email);
    }
    if let Some(password) = changes.password {
        active_model.password = Set(password);
    }
    if let Some(first_name) = changes.first_name {
        active_model.first_name = Set(first_name);
    }
    if let Some(last_name) = changes.last_name {
        active_model.last_name = Set(last_name);
    }
    if let Some(is_active) = changes.is_active {
        active_model.is_active = Set(is_active);
    }
    active_model
}

#[async_trait]
impl domain::user::UserRepository for UserRepositoryImpl {
    async fn create(&self, new_user: NewUser) -> Result<User, UserError> {
        let email = new_user.validate()?;
        let raw_email = email.to_string();
        let model = new_active_model(new_user, email, now())
            .insert(&self.db)
            .await
            .map_err(|e| map_db_err(e, Some(&raw_email)))?;
        debug!("created user {} <{}>", model.id, model.email);
        Ok(model.into())
    }

    async fn create_many(&self, new_users: Vec<NewUser>) -> Result<Vec<User>, UserError> {
        let mut validated = Vec::with_capacity(new_users.len());
        for new_user in new_users {
            let email = new_user.validate()?;
            validated.push((new_user, email));
        }

        let txn = self.db.begin().await.map_err(|e| map_db_err(e, None))?;
        let at = now();
        let mut created = Vec::with_capacity(validated.len());
        for (new_user, email) in validated {
            let raw_email = email.to_string();
            // 出错时 txn 被 drop，整批回滚
            let model = new_active_model(new_user, email, at)
                .insert(&txn)
                .await
                .map_err(|e| map_db_err(e, Some(&raw_email)))?;
            created.push(User::from(model));
        }
        txn.commit().await.map_err(|e| map_db_err(e, None))?;
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError> {
        let result = Entity::find_by_id(id.as_i32())
            .one(&self.db)
            .await
            .map_err(|e| map_db_err(e, None))?;
        Ok(result.map(User::from))
    }

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, UserError> {
        let result = Entity::find()
            .filter(condition(&filter))
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| map_db_err(e, None))?;
        Ok(result.map(User::from))
    }

    async fn find_all(&self, filter: UserFilter) -> Result<Vec<User>, UserError> {
        let models = Entity::find()
            .filter(condition(&filter))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| map_db_err(e, None))?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self, filter: UserFilter) -> Result<u64, UserError> {
        let count = Entity::find()
            .filter(condition(&filter))
            .count(&self.db)
            .await
            .map_err(|e| map_db_err(e, None))?;
        Ok(count)
    }

    async fn update(&self, user: &mut User, changes: UserChanges) -> Result<(), UserError> {
        changes.validate()?;
        let email = changes.email.clone();
        let mut active_model = changes_active_model(changes, now());
        active_model.id = Unchanged(user.id.as_i32());

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => UserError::UserNotFound(user.id),
            e => map_db_err(e, email.as_deref()),
        })?;
        *user = model.into();
        Ok(())
    }

    async fn update_where(
        &self,
        filter: UserFilter,
        changes: UserChanges,
    ) -> Result<u64, UserError> {
        changes.validate()?;
        let email = changes.email.clone();
        let result = Entity::update_many()
            .set(changes_active_model(changes, now()))
            .filter(condition(&filter))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err(e, email.as_deref()))?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, user: &User) -> Result<u64, UserError> {
        let result = Entity::delete_by_id(user.id.as_i32())
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err(e, None))?;
        Ok(result.rows_affected)
    }

    async fn delete_where(&self, filter: UserFilter) -> Result<u64, UserError> {
        if filter.is_unrestricted() {
            debug!("deleting all users");
        }
        let result = Entity::delete_many()
            .filter(condition(&filter))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err(e, None))?;
        Ok(result.rows_affected)
    }
}
