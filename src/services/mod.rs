pub mod admin_service;
pub mod admin_service_impl;
pub mod chat_service;
pub mod chat_service_impl;
pub mod execution_service;
pub mod execution_service_impl;
pub mod firecrawl_service;
pub mod firecrawl_service_impl;
pub mod scout_service;
pub mod scout_service_impl;

pub use admin_service::{AdminError, AdminService};
pub use admin_service_impl::SeaOrmAdminService;
pub use chat_service::{ChatService, ChatServiceError};
pub use chat_service_impl::DefaultChatService;
pub use execution_service::{ExecutionError, ExecutionService};
pub use execution_service_impl::SeaOrmExecutionService;
pub use firecrawl_service::{FirecrawlKeyService, KeyError};
pub use firecrawl_service_impl::PartnerKeyService;
pub use scout_service::{ScoutError, ScoutService};
pub use scout_service_impl::SeaOrmScoutService;
