//! `SeaORM` implementation of the `ScoutService` trait.

use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::api::types::{CreateScoutRequest, ScoutDto, UpdateScoutRequest};
use crate::config::Config;
use crate::db::{NewScout, ScoutUpdate, Store};
use crate::domain::Frequency;
use crate::entities::scouts;
use crate::services::scout_service::{ScoutError, ScoutService};

pub struct SeaOrmScoutService {
    store: Arc<Store>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmScoutService {
    #[must_use]
    pub const fn new(store: Arc<Store>, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    /// Fetches a scout and checks ownership. Non-existent and foreign
    /// scouts are indistinguishable to the caller.
    async fn owned_scout(&self, user_id: &str, scout_id: &str) -> Result<scouts::Model, ScoutError> {
        let scout = self
            .store
            .get_scout(scout_id)
            .await?
            .ok_or(ScoutError::NotOwner)?;

        if scout.user_id != user_id {
            return Err(ScoutError::NotOwner);
        }
        Ok(scout)
    }
}

fn parse_frequency(raw: Option<&str>) -> Result<Option<Frequency>, ScoutError> {
    raw.map(|s| Frequency::from_str(s).map_err(ScoutError::Validation))
        .transpose()
}

#[async_trait::async_trait]
impl ScoutService for SeaOrmScoutService {
    async fn list(&self, user_id: &str) -> Result<Vec<ScoutDto>, ScoutError> {
        let scouts = self.store.list_scouts_for_user(user_id).await?;
        Ok(scouts.into_iter().map(ScoutDto::from).collect())
    }

    async fn create(
        &self,
        user_id: &str,
        request: CreateScoutRequest,
    ) -> Result<ScoutDto, ScoutError> {
        if request.title.trim().is_empty() {
            return Err(ScoutError::Validation("Title must not be empty".into()));
        }

        let limit = self.config.read().await.quota.max_scouts_per_user;
        let owned = self.store.count_scouts_for_user(user_id).await?;
        if owned >= limit {
            return Err(ScoutError::QuotaExceeded { limit });
        }

        let frequency = parse_frequency(request.frequency.as_deref())?;
        let scout = self
            .store
            .create_scout(user_id, NewScout {
                title: request.title,
                description: request.description,
                goal: request.goal,
                search_queries: request.search_queries,
                location: request.location,
                frequency,
            })
            .await?;

        Ok(ScoutDto::from(scout))
    }

    async fn get(&self, user_id: &str, scout_id: &str) -> Result<ScoutDto, ScoutError> {
        let scout = self.owned_scout(user_id, scout_id).await?;
        Ok(ScoutDto::from(scout))
    }

    async fn update(
        &self,
        user_id: &str,
        scout_id: &str,
        request: UpdateScoutRequest,
    ) -> Result<ScoutDto, ScoutError> {
        self.owned_scout(user_id, scout_id).await?;

        let frequency = parse_frequency(request.frequency.as_deref())?;
        let update = ScoutUpdate {
            title: request.title,
            description: request.description,
            goal: request.goal,
            search_queries: request.search_queries,
            location: request.location,
            frequency,
        };

        let updated = self
            .store
            .update_scout(scout_id, update)
            .await?
            .ok_or_else(|| ScoutError::NotFound(scout_id.to_string()))?;

        Ok(ScoutDto::from(updated))
    }

    async fn activate(&self, user_id: &str, scout_id: &str) -> Result<ScoutDto, ScoutError> {
        let scout = self.owned_scout(user_id, scout_id).await?;

        let mut missing = Vec::new();
        if scout.title.trim().is_empty() {
            missing.push("title");
        }
        if scout.goal.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("goal");
        }
        let has_query = scout
            .search_queries
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .is_some_and(|q| !q.is_empty());
        if !has_query {
            missing.push("search queries");
        }
        if scout.frequency.is_none() {
            missing.push("frequency");
        }
        if !missing.is_empty() {
            return Err(ScoutError::Incomplete(missing.join(", ")));
        }

        let activated = self
            .store
            .set_scout_active(scout_id, true)
            .await?
            .ok_or_else(|| ScoutError::NotFound(scout_id.to_string()))?;

        info!("Activated scout {scout_id}");
        Ok(ScoutDto::from(activated))
    }

    async fn delete(&self, user_id: &str, scout_id: &str) -> Result<(), ScoutError> {
        self.owned_scout(user_id, scout_id).await?;

        if !self.store.remove_scout(scout_id).await? {
            return Err(ScoutError::NotFound(scout_id.to_string()));
        }
        Ok(())
    }
}
