use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key for the seeded admin account (regenerate in production).
pub const DEFAULT_API_KEY: &str = "openscouts_default_api_key_please_regenerate";

/// Email of the seeded admin account; the suffix must match
/// `admin.email_domain` for the admin endpoints to accept it.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@openscouts.dev";

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"password";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Scouts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ScoutMessages)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ScoutExecutions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ScoutExecutionSteps)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserPreferences)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(FirecrawlUsageLogs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Steps are always read in step_number order within an execution.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_steps_execution_number")
                    .table(ScoutExecutionSteps)
                    .col(crate::entities::scout_execution_steps::Column::ExecutionId)
                    .col(crate::entities::scout_execution_steps::Column::StepNumber)
                    .to_owned(),
            )
            .await?;

        // Seed default admin user with hashed password
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();
        let admin_id = uuid::Uuid::new_v4().to_string();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Id,
                crate::entities::users::Column::Email,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::ApiKey,
                crate::entities::users::Column::EmailConfirmed,
                crate::entities::users::Column::CreatedAt,
                crate::entities::users::Column::UpdatedAt,
            ])
            .values_panic([
                admin_id.into(),
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                DEFAULT_API_KEY.into(),
                true.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FirecrawlUsageLogs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserPreferences).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScoutExecutionSteps).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScoutExecutions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScoutMessages).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Scouts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
