use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{KeyStatus, RunStatus, UserLocation};
use crate::entities::{scout_execution_steps, scout_executions, scout_messages, scouts};

pub mod migrator;
pub mod repositories;

pub use crate::entities::user_preferences::Model as UserPreferencesRow;
pub use repositories::execution::NewStep;
pub use repositories::scout::{NewScout, ScoutUpdate};
pub use repositories::usage::UsageEvent;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn scout_repo(&self) -> repositories::scout::ScoutRepository {
        repositories::scout::ScoutRepository::new(self.conn.clone())
    }

    fn message_repo(&self) -> repositories::message::MessageRepository {
        repositories::message::MessageRepository::new(self.conn.clone())
    }

    fn execution_repo(&self) -> repositories::execution::ExecutionRepository {
        repositories::execution::ExecutionRepository::new(self.conn.clone())
    }

    fn preferences_repo(&self) -> repositories::preferences::PreferencesRepository {
        repositories::preferences::PreferencesRepository::new(self.conn.clone())
    }

    fn usage_repo(&self) -> repositories::usage::UsageRepository {
        repositories::usage::UsageRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, email: &str, password: &str) -> Result<User> {
        self.user_repo().create(email, password).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn touch_last_sign_in(&self, id: &str) -> Result<()> {
        self.user_repo().touch_last_sign_in(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn list_users_page(&self, page: u64, per_page: u64) -> Result<Vec<User>> {
        self.user_repo().list_page(page, per_page).await
    }

    pub async fn remove_user(&self, id: &str) -> Result<bool> {
        self.user_repo().remove(id).await
    }

    // ========== Scouts ==========

    pub async fn create_scout(&self, user_id: &str, new: NewScout) -> Result<scouts::Model> {
        self.scout_repo().create(user_id, new).await
    }

    pub async fn get_scout(&self, id: &str) -> Result<Option<scouts::Model>> {
        self.scout_repo().get(id).await
    }

    pub async fn list_scouts_for_user(&self, user_id: &str) -> Result<Vec<scouts::Model>> {
        self.scout_repo().list_for_user(user_id).await
    }

    pub async fn count_scouts_for_user(&self, user_id: &str) -> Result<u64> {
        self.scout_repo().count_for_user(user_id).await
    }

    pub async fn update_scout(
        &self,
        id: &str,
        update: ScoutUpdate,
    ) -> Result<Option<scouts::Model>> {
        self.scout_repo().update(id, update).await
    }

    pub async fn set_scout_active(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<Option<scouts::Model>> {
        self.scout_repo().set_active(id, is_active).await
    }

    pub async fn touch_scout_last_run(&self, id: &str) -> Result<()> {
        self.scout_repo().touch_last_run(id).await
    }

    pub async fn list_scout_owners(&self, limit: u64) -> Result<Vec<(String, String)>> {
        self.scout_repo().list_owners(limit).await
    }

    pub async fn remove_scout(&self, id: &str) -> Result<bool> {
        self.scout_repo().remove(id).await
    }

    // ========== Messages ==========

    pub async fn append_message(
        &self,
        scout_id: &str,
        role: &str,
        content: &str,
    ) -> Result<scout_messages::Model> {
        self.message_repo().append(scout_id, role, content).await
    }

    pub async fn list_messages(&self, scout_id: &str) -> Result<Vec<scout_messages::Model>> {
        self.message_repo().list_for_scout(scout_id).await
    }

    // ========== Executions ==========

    pub async fn create_execution(
        &self,
        id: &str,
        scout_id: &str,
        started_at: Option<&str>,
    ) -> Result<scout_executions::Model> {
        self.execution_repo().create(id, scout_id, started_at).await
    }

    pub async fn get_execution(&self, id: &str) -> Result<Option<scout_executions::Model>> {
        self.execution_repo().get(id).await
    }

    pub async fn update_execution_status(
        &self,
        id: &str,
        status: RunStatus,
        completed_at: Option<&str>,
    ) -> Result<Option<scout_executions::Model>> {
        self.execution_repo()
            .update_status(id, status, completed_at)
            .await
    }

    pub async fn list_executions_for_scout(
        &self,
        scout_id: &str,
    ) -> Result<Vec<scout_executions::Model>> {
        self.execution_repo().list_for_scout(scout_id).await
    }

    pub async fn latest_execution_for_scout(
        &self,
        scout_id: &str,
    ) -> Result<Option<scout_executions::Model>> {
        self.execution_repo().latest_for_scout(scout_id).await
    }

    pub async fn list_execution_statuses(&self, limit: u64) -> Result<Vec<(String, String)>> {
        self.execution_repo().list_statuses(limit).await
    }

    pub async fn add_execution_step(
        &self,
        execution_id: &str,
        step: NewStep,
    ) -> Result<scout_execution_steps::Model> {
        self.execution_repo().add_step(execution_id, step).await
    }

    pub async fn list_execution_steps(
        &self,
        execution_id: &str,
    ) -> Result<Vec<scout_execution_steps::Model>> {
        self.execution_repo().list_steps(execution_id).await
    }

    // ========== Preferences ==========

    pub async fn get_preferences(&self, user_id: &str) -> Result<Option<UserPreferencesRow>> {
        self.preferences_repo().get(user_id).await
    }

    pub async fn set_user_location(&self, user_id: &str, location: &UserLocation) -> Result<()> {
        self.preferences_repo()
            .set_location(user_id, location)
            .await
    }

    pub async fn set_key_status(
        &self,
        user_id: &str,
        status: KeyStatus,
        api_key: Option<&str>,
        error: Option<&str>,
    ) -> Result<()> {
        self.preferences_repo()
            .set_key_status(user_id, status, api_key, error)
            .await
    }

    pub async fn mark_key_invalid(&self, user_id: &str, reason: &str) -> Result<()> {
        self.preferences_repo()
            .mark_key_invalid(user_id, reason)
            .await
    }

    // ========== Usage logs ==========

    pub async fn log_usage(&self, event: UsageEvent) -> Result<()> {
        self.usage_repo().log(event).await
    }
}
