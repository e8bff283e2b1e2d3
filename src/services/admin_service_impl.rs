//! Admin service: paged user listing, capped scans, in-memory joins, and a
//! bounded credit fan-out against the partner API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::types::{AdminOverviewDto, AdminUserDto};
use crate::clients::FirecrawlClient;
use crate::config::Config;
use crate::db::{Store, User};
use crate::services::admin_service::{AdminError, AdminService};

pub struct SeaOrmAdminService {
    store: Arc<Store>,
    firecrawl: Arc<FirecrawlClient>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(
        store: Arc<Store>,
        firecrawl: Arc<FirecrawlClient>,
        config: Arc<RwLock<Config>>,
    ) -> Self {
        Self {
            store,
            firecrawl,
            config,
        }
    }

    async fn all_users(&self, per_page: u64) -> Result<Vec<User>, AdminError> {
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.store.list_users_page(page, per_page).await?;
            let len = batch.len() as u64;
            users.extend(batch);
            if len < per_page {
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    /// Remaining credits per user, fetched with bounded concurrency and a
    /// per-request timeout. Failures yield no entry (rendered as null).
    async fn credit_balances(
        &self,
        keys: Vec<(String, String)>,
        concurrency: usize,
        timeout: Duration,
    ) -> HashMap<String, i64> {
        let firecrawl = &self.firecrawl;

        stream::iter(keys)
            .map(|(user_id, api_key)| async move {
                let credits =
                    match tokio::time::timeout(timeout, firecrawl.credit_usage(&api_key)).await {
                        Ok(credits) => credits,
                        Err(_) => {
                            warn!("Credit lookup for user {user_id} timed out");
                            None
                        }
                    };
                credits.map(|c| (user_id, c))
            })
            .buffer_unordered(concurrency)
            .filter_map(|entry| async move { entry })
            .collect()
            .await
    }
}

/// Per-owner counts out of capped scans.
fn count_by_owner(pairs: &[(String, String)]) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for (_, owner) in pairs {
        *counts.entry(owner.clone()).or_default() += 1;
    }
    counts
}

/// Execution counts rolled up to scout owners.
fn execution_counts(
    scout_owners: &[(String, String)],
    execution_scouts: &[(String, String)],
) -> HashMap<String, u64> {
    let owner_of: HashMap<&str, &str> = scout_owners
        .iter()
        .map(|(scout, owner)| (scout.as_str(), owner.as_str()))
        .collect();

    let mut counts: HashMap<String, u64> = HashMap::new();
    for (scout_id, _) in execution_scouts {
        if let Some(owner) = owner_of.get(scout_id.as_str()) {
            *counts.entry((*owner).to_string()).or_default() += 1;
        }
    }
    counts
}

#[async_trait::async_trait]
impl AdminService for SeaOrmAdminService {
    async fn overview(&self) -> Result<AdminOverviewDto, AdminError> {
        let admin = self.config.read().await.admin.clone();

        let users = self.all_users(admin.user_page_size).await?;
        let scout_owners = self.store.list_scout_owners(admin.scout_scan_limit).await?;
        let execution_scouts = self
            .store
            .list_execution_statuses(admin.execution_scan_limit)
            .await?;

        let scout_counts = count_by_owner(&scout_owners);
        let execution_counts = execution_counts(&scout_owners, &execution_scouts);

        let mut keys = Vec::new();
        for user in &users {
            if let Some(prefs) = self.store.get_preferences(&user.id).await? {
                if let Some(api_key) = prefs.firecrawl_api_key {
                    keys.push((user.id.clone(), api_key));
                }
            }
        }
        let credits = self
            .credit_balances(
                keys,
                admin.credit_fetch_concurrency,
                Duration::from_secs(admin.credit_fetch_timeout_seconds),
            )
            .await;

        let total_users = users.len() as u64;
        let total_scouts = scout_owners.len() as u64;
        let total_executions = execution_scouts.len() as u64;

        let users = users
            .into_iter()
            .map(|user| AdminUserDto {
                scout_count: scout_counts.get(&user.id).copied().unwrap_or(0),
                execution_count: execution_counts.get(&user.id).copied().unwrap_or(0),
                remaining_credits: credits.get(&user.id).copied(),
                id: user.id,
                email: user.email,
                created_at: user.created_at,
                last_sign_in_at: user.last_sign_in_at,
            })
            .collect();

        Ok(AdminOverviewDto {
            users,
            total_users,
            total_scouts,
            total_executions,
        })
    }

    async fn delete_user(&self, acting_user_id: &str, user_id: &str) -> Result<(), AdminError> {
        if acting_user_id == user_id {
            return Err(AdminError::SelfDeletion);
        }

        if !self.store.remove_user(user_id).await? {
            return Err(AdminError::UserNotFound(user_id.to_string()));
        }

        info!("Admin {acting_user_id} deleted user {user_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
            .collect()
    }

    #[test]
    fn counts_scouts_per_owner() {
        let owners = pairs(&[("s1", "alice"), ("s2", "alice"), ("s3", "bob")]);
        let counts = count_by_owner(&owners);

        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.get("bob"), Some(&1));
    }

    #[test]
    fn rolls_executions_up_to_scout_owners() {
        let owners = pairs(&[("s1", "alice"), ("s2", "bob")]);
        let executions = pairs(&[
            ("s1", "completed"),
            ("s1", "failed"),
            ("s2", "running"),
            ("orphan", "completed"),
        ]);

        let counts = execution_counts(&owners, &executions);

        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.get("bob"), Some(&1));
        // Executions of unknown scouts are dropped, not misattributed.
        assert_eq!(counts.len(), 2);
    }
}
