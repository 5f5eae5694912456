//! User repository for account and attribution lookups.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use centralmei_core::request::resolve_operator;
use centralmei_shared::types::UserId;

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Email already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login email.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Full name.
    pub full_name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Back-office access.
    pub is_staff: bool,
    /// Full administrative access.
    pub is_superuser: bool,
}

/// User repository for CRUD and attribution lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmailTaken` when the email is already registered.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        if self.find_by_email(&input.email).await?.is_some() {
            return Err(UserError::EmailTaken(input.email));
        }

        let now = Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            full_name: Set(input.full_name),
            phone: Set(input.phone),
            is_staff: Set(input.is_staff),
            is_superuser: Set(input.is_superuser),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Resolves the operator an automatically created sale is attributed
    /// to: the request's own user, else the first superuser, else the
    /// first staff user. `None` when no eligible account exists.
    pub async fn find_operator(
        &self,
        request_user: Option<UserId>,
    ) -> Result<Option<UserId>, UserError> {
        // The request's user may have been deleted since submission
        let request_user = match request_user {
            Some(id) => self
                .find_by_id(id.into_inner())
                .await?
                .map(|u| UserId::from_uuid(u.id)),
            None => None,
        };

        if let Some(found) = request_user {
            return Ok(Some(found));
        }

        let first_superuser = self.first_matching(users::Column::IsSuperuser).await?;
        let first_staff = self.first_matching(users::Column::IsStaff).await?;

        Ok(resolve_operator(None, first_superuser, first_staff))
    }

    async fn first_matching(&self, flag: users::Column) -> Result<Option<UserId>, UserError> {
        Ok(users::Entity::find()
            .filter(flag.eq(true))
            .filter(users::Column::IsActive.eq(true))
            .order_by_asc(users::Column::CreatedAt)
            .one(&self.db)
            .await?
            .map(|u| UserId::from_uuid(u.id)))
    }
}
