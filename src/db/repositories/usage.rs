use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, NotSet, Set};

use crate::entities::firecrawl_usage_logs;

/// A single crawl API usage event, recorded whenever a run consumes credits.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub user_id: String,
    pub scout_id: Option<String>,
    pub execution_id: Option<String>,
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
    pub api_calls_count: i32,
}

pub struct UsageRepository {
    conn: DatabaseConnection,
}

impl UsageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn log(&self, event: UsageEvent) -> Result<()> {
        let model = firecrawl_usage_logs::ActiveModel {
            id: NotSet,
            user_id: Set(event.user_id),
            scout_id: Set(event.scout_id),
            execution_id: Set(event.execution_id),
            used_fallback: Set(event.used_fallback),
            fallback_reason: Set(event.fallback_reason),
            api_calls_count: Set(event.api_calls_count),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        model.insert(&self.conn).await?;
        Ok(())
    }
}
