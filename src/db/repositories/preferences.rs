use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::{KeyStatus, UserLocation};
use crate::entities::user_preferences;

pub struct PreferencesRepository {
    conn: DatabaseConnection,
}

impl PreferencesRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<user_preferences::Model>> {
        user_preferences::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user preferences")
    }

    async fn get_or_default(&self, user_id: &str) -> Result<user_preferences::Model> {
        if let Some(existing) = self.get(user_id).await? {
            return Ok(existing);
        }

        let model = user_preferences::ActiveModel {
            user_id: Set(user_id.to_string()),
            location: Set(None),
            firecrawl_api_key: Set(None),
            firecrawl_key_status: Set(None),
            firecrawl_key_created_at: Set(None),
            firecrawl_key_error: Set(None),
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn set_location(&self, user_id: &str, location: &UserLocation) -> Result<()> {
        let existing = self.get_or_default(user_id).await?;
        let encoded = serde_json::to_string(location).context("Failed to encode location")?;

        let mut active: user_preferences::ActiveModel = existing.into();
        active.location = Set(Some(encoded));
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Record a key provisioning outcome. An active key replaces whatever was
    /// stored before; a failed attempt keeps the old key untouched and only
    /// records the error.
    pub async fn set_key_status(
        &self,
        user_id: &str,
        status: KeyStatus,
        api_key: Option<&str>,
        error: Option<&str>,
    ) -> Result<()> {
        let existing = self.get_or_default(user_id).await?;
        let mut active: user_preferences::ActiveModel = existing.into();

        active.firecrawl_key_status = Set(Some(status.as_str().to_string()));
        active.firecrawl_key_error = Set(error.map(ToString::to_string));
        if let Some(key) = api_key {
            active.firecrawl_api_key = Set(Some(key.to_string()));
            active.firecrawl_key_created_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        }

        active.update(&self.conn).await?;
        Ok(())
    }

    pub async fn mark_key_invalid(&self, user_id: &str, reason: &str) -> Result<()> {
        let Some(existing) = self.get(user_id).await? else {
            return Ok(());
        };

        let mut active: user_preferences::ActiveModel = existing.into();
        active.firecrawl_key_status = Set(Some(KeyStatus::Invalid.as_str().to_string()));
        active.firecrawl_key_error = Set(Some(reason.to_string()));
        active.update(&self.conn).await?;

        Ok(())
    }
}
