use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::{Frequency, UserLocation};
use crate::entities::{scout_execution_steps, scout_executions, scout_messages, scouts};

/// Fields supplied when creating a scout. Everything beyond the title is
/// filled in incrementally as the setup conversation progresses.
#[derive(Debug, Clone, Default)]
pub struct NewScout {
    pub title: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub search_queries: Option<Vec<String>>,
    pub location: Option<UserLocation>,
    pub frequency: Option<Frequency>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ScoutUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub search_queries: Option<Vec<String>>,
    pub location: Option<UserLocation>,
    pub frequency: Option<Frequency>,
}

impl ScoutUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.goal.is_none()
            && self.search_queries.is_none()
            && self.location.is_none()
            && self.frequency.is_none()
    }
}

pub struct ScoutRepository {
    conn: DatabaseConnection,
}

impl ScoutRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: &str, new: NewScout) -> Result<scouts::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = scouts::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            title: Set(new.title),
            description: Set(new.description),
            goal: Set(new.goal),
            search_queries: Set(encode_queries(new.search_queries.as_deref())?),
            location: Set(encode_location(new.location.as_ref())?),
            frequency: Set(new.frequency.map(|f| f.as_str().to_string())),
            is_active: Set(false),
            last_run_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.conn).await?;
        info!("Created scout '{}' for user {}", inserted.title, user_id);
        Ok(inserted)
    }

    pub async fn get(&self, id: &str) -> Result<Option<scouts::Model>> {
        scouts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query scout by ID")
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<scouts::Model>> {
        Ok(scouts::Entity::find()
            .filter(scouts::Column::UserId.eq(user_id))
            .order_by_desc(scouts::Column::CreatedAt)
            .all(&self.conn)
            .await?)
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<u64> {
        Ok(scouts::Entity::find()
            .filter(scouts::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await?)
    }

    /// Apply a partial update. Returns the refreshed row, or `None` when the
    /// scout does not exist.
    pub async fn update(&self, id: &str, update: ScoutUpdate) -> Result<Option<scouts::Model>> {
        let Some(existing) = scouts::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: scouts::ActiveModel = existing.into();

        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(goal) = update.goal {
            active.goal = Set(Some(goal));
        }
        if let Some(queries) = update.search_queries {
            active.search_queries = Set(encode_queries(Some(&queries))?);
        }
        if let Some(location) = update.location {
            active.location = Set(encode_location(Some(&location))?);
        }
        if let Some(frequency) = update.frequency {
            active.frequency = Set(Some(frequency.as_str().to_string()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<Option<scouts::Model>> {
        let Some(existing) = scouts::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: scouts::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn touch_last_run(&self, id: &str) -> Result<()> {
        let Some(existing) = scouts::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(());
        };

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: scouts::ActiveModel = existing.into();
        active.last_run_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// (scout id, owner id) pairs for the admin overview, capped so a runaway
    /// table cannot blow up the dashboard query.
    pub async fn list_owners(&self, limit: u64) -> Result<Vec<(String, String)>> {
        let rows = scouts::Entity::find()
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|s| (s.id, s.user_id)).collect())
    }

    /// Delete a scout with its messages, executions and steps in one
    /// transaction.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let execution_ids: Vec<String> = scout_executions::Entity::find()
            .filter(scout_executions::Column::ScoutId.eq(id))
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
            .filter(scout_executions::Column::ScoutId.eq(id))
            .exec(&txn)
            .await?;

        scout_messages::Entity::delete_many()
            .filter(scout_messages::Column::ScoutId.eq(id))
            .exec(&txn)
            .await?;

        let result = scouts::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed scout {id} and its history");
        }
        Ok(removed)
    }
}

fn encode_queries(queries: Option<&[String]>) -> Result<Option<String>> {
    queries
        .map(|q| serde_json::to_string(q).context("Failed to encode search queries"))
        .transpose()
}

fn encode_location(location: Option<&UserLocation>) -> Result<Option<String>> {
    location
        .map(|l| serde_json::to_string(l).context("Failed to encode location"))
        .transpose()
}
