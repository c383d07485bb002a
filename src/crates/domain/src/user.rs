use super::value::{Email, UserId};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// 用户领域错误
///
/// 用户领域中可能发生的所有错误类型。读取不到记录不属于错误，用 `Ok(None)` 表示。
#[derive(Error, Debug)]
pub enum UserError {
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("email already in use: {0}")]
    DuplicateEmail(String),
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("database unavailable: {0}")]
    Connection(String),
    #[error("{0}")]
    DbErr(String),
}

/// 用户聚合根
///
/// 系统中唯一的持久化实体。`id` 与 `created_at` 在插入后不可变，
/// `UserChanges` 里也无法表达对它们的修改。
///
/// `password` 按调用方给出的值原样保存，这一层不做哈希。
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,                   // 自增主键
    pub email: String,                // 唯一
    pub password: String,             // 原样保存
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,              // 默认 true
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,    // 每次修改刷新
}

/// 新建用户的输入
///
/// `id` 与时间戳由存储层分配，`is_active` 缺省为 true。
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

impl NewUser {
    pub fn new(email: &str, password: &str) -> Self {
        NewUser {
            email: String::from(email),
            password: String::from(password),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(String::from(first_name));
        self.last_name = Some(String::from(last_name));
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = Some(false);
        self
    }

    pub fn validate(&self) -> Result<Email, UserError> {
        Email::parse(&self.email).ok_or_else(|| UserError::InvalidEmail(self.email.clone()))
    }
}

/// 部分字段更新
///
/// 只有 `Some` 的字段会被写入；姓名字段的 `Some(None)` 表示清空。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(String::from(email));
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(String::from(password));
        self
    }

    pub fn first_name(mut self, first_name: Option<&str>) -> Self {
        self.first_name = Some(first_name.map(String::from));
        self
    }

    pub fn last_name(mut self, last_name: Option<&str>) -> Self {
        self.last_name = Some(last_name.map(String::from));
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn validate(&self) -> Result<(), UserError> {
        if let Some(email) = &self.email {
            if Email::parse(email).is_none() {
                return Err(UserError::InvalidEmail(email.clone()));
            }
        }
        Ok(())
    }
}

/// 查询/更新/删除的谓词
///
/// 各字段之间是 AND 关系。默认值（全部为 `None`）匹配所有行。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub email: Option<String>,
    /// SQL `LIKE` 模式，例如 `bulk%`
    pub email_like: Option<String>,
    pub is_active: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: UserId) -> Self {
        UserFilter {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_email(email: &str) -> Self {
        UserFilter {
            email: Some(String::from(email)),
            ..Default::default()
        }
    }

    pub fn email_like(pattern: &str) -> Self {
        UserFilter {
            email_like: Some(String::from(pattern)),
            ..Default::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        UserFilter {
            is_active: Some(is_active),
            ..Default::default()
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == UserFilter::default()
    }
}

/// 用户仓储接口
///
/// 依赖反转原则 (DIP) 的体现。定义领域需要的仓储能力，
/// 由基础设施层实现。使领域逻辑不直接依赖于具体的数据访问技术。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户，校验邮箱格式，重复邮箱返回 `DuplicateEmail`
    async fn create(&self, new_user: NewUser) -> Result<User, UserError>;

    /// 批量创建，全部成功或全部不写入
    async fn create_many(&self, new_users: Vec<NewUser>) -> Result<Vec<User>, UserError>;

    /// 根据用户ID查找用户
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError>;

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, UserError>;

    /// 按 id 升序返回所有匹配的用户
    async fn find_all(&self, filter: UserFilter) -> Result<Vec<User>, UserError>;

    async fn count(&self, filter: UserFilter) -> Result<u64, UserError>;

    /// 更新单个已加载的用户，成功后 `user` 会被刷新为存储中的最新值
    async fn update(&self, user: &mut User, changes: UserChanges) -> Result<(), UserError>;

    /// 更新所有匹配的用户，返回受影响的行数
    async fn update_where(&self, filter: UserFilter, changes: UserChanges)
        -> Result<u64, UserError>;

    /// 删除单个用户，返回删除的行数
    async fn delete(&self, user: &User) -> Result<u64, UserError>;

    /// 删除所有匹配的用户；不加限制的谓词会清空整张表
    async fn delete_where(&self, filter: UserFilter) -> Result<u64, UserError>;
}
