use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::clients::{ChatClient, FirecrawlClient, RunnerClient};
use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    AdminService, ChatService, DefaultChatService, ExecutionService, FirecrawlKeyService,
    PartnerKeyService, ScoutService, SeaOrmAdminService, SeaOrmExecutionService,
    SeaOrmScoutService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused by every outbound client to enable connection pooling and avoid
/// socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("OpenScouts/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub firecrawl: Arc<FirecrawlClient>,

    pub runner: Arc<RunnerClient>,

    pub chat: Arc<ChatClient>,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub scout_service: Arc<dyn ScoutService>,

    pub chat_service: Arc<dyn ChatService>,

    pub execution_service: Arc<dyn ExecutionService>,

    pub key_service: Arc<dyn FirecrawlKeyService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.general.http_timeout_seconds)?;

        let firecrawl = Arc::new(FirecrawlClient::new(http_client.clone(), &config.firecrawl));
        let runner = Arc::new(RunnerClient::new(http_client.clone(), &config.runner));
        let chat = Arc::new(ChatClient::new(http_client, &config.chat));

        let config_arc = Arc::new(RwLock::new(config));
        let store_arc = Arc::new(store.clone());

        let key_service = Arc::new(PartnerKeyService::new(
            store_arc.clone(),
            firecrawl.clone(),
            config_arc.clone(),
            event_bus.clone(),
        )) as Arc<dyn FirecrawlKeyService>;

        let scout_service = Arc::new(SeaOrmScoutService::new(
            store_arc.clone(),
            config_arc.clone(),
        )) as Arc<dyn ScoutService>;

        let chat_service = Arc::new(DefaultChatService::new(store_arc.clone(), chat.clone()))
            as Arc<dyn ChatService>;

        let execution_service = Arc::new(SeaOrmExecutionService::new(
            store_arc.clone(),
            runner.clone(),
            key_service.clone(),
            config_arc.clone(),
            event_bus.clone(),
        )) as Arc<dyn ExecutionService>;

        let admin_service = Arc::new(SeaOrmAdminService::new(
            store_arc,
            firecrawl.clone(),
            config_arc.clone(),
        )) as Arc<dyn AdminService>;

        Ok(Self {
            config: config_arc,
            store,
            firecrawl,
            runner,
            chat,
            event_bus,
            scout_service,
            chat_service,
            execution_service,
            key_service,
            admin_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
