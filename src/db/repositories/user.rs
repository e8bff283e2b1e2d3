use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tokio::task;
use tracing::info;

use crate::entities::{
    firecrawl_usage_logs, scout_execution_steps, scout_executions, scout_messages, scouts,
    user_preferences, users,
};

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub api_key: String,
    pub email_confirmed: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_sign_in_at: Option<String>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            api_key: model.api_key,
            email_confirmed: model.email_confirmed,
            created_at: model.created_at,
            updated_at: model.updated_at,
            last_sign_in_at: model.last_sign_in_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, email: &str, password: &str) -> Result<User> {
        let password = password.to_string();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let model = users::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            api_key: Set(generate_api_key()),
            email_confirmed: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            last_sign_in_at: Set(None),
        };

        let inserted = model.insert(&self.conn).await?;
        info!("Created user account: {}", inserted.email);
        Ok(User::from(inserted))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Verify password for a user.
    /// Uses `spawn_blocking` because Argon2 verification is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Verify API key and return the associated user
    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query user by API key")?;

        Ok(user.map(User::from))
    }

    pub async fn touch_last_sign_in(&self, id: &str) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: users::ActiveModel = user.into();
        active.last_sign_in_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(users::Entity::find().count(&self.conn).await?)
    }

    /// One page of users ordered by creation date, newest first.
    /// `page` is 1-based, mirroring the managed-auth admin API this replaces.
    pub async fn list_page(&self, page: u64, per_page: u64) -> Result<Vec<User>> {
        let offset = page.saturating_sub(1) * per_page;
        let rows = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .offset(offset)
            .limit(per_page)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Delete a user and everything hanging off them in one transaction.
    /// Child rows are removed explicitly so the cascade does not depend on
    /// the SQLite foreign_keys pragma.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let scout_ids: Vec<String> = scouts::Entity::find()
            .filter(scouts::Column::UserId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        if !scout_ids.is_empty() {
            let execution_ids: Vec<String> = scout_executions::Entity::find()
                .filter(scout_executions::Column::ScoutId.is_in(scout_ids.clone()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect();

            if !execution_ids.is_empty() {
                scout_execution_steps::Entity::delete_many()
                    .filter(scout_execution_steps::Column::ExecutionId.is_in(execution_ids))
                    .exec(&txn)
                    .await?;
            }

            scout_executions::Entity::delete_many()
                .filter(scout_executions::Column::ScoutId.is_in(scout_ids.clone()))
                .exec(&txn)
                .await?;

            scout_messages::Entity::delete_many()
                .filter(scout_messages::Column::ScoutId.is_in(scout_ids))
                .exec(&txn)
                .await?;
        }

        scouts::Entity::delete_many()
            .filter(scouts::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        user_preferences::Entity::delete_many()
            .filter(user_preferences::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        firecrawl_usage_logs::Entity::delete_many()
            .filter(firecrawl_usage_logs::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed user {id} and all owned data");
        }
        Ok(removed)
    }
}

/// Hash a password using Argon2id with default params.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random API key (64 character hex string)
#[must_use]
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
