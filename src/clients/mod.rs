pub mod chat;
pub mod firecrawl;
pub mod runner;

pub use chat::ChatClient;
pub use firecrawl::FirecrawlClient;
pub use runner::RunnerClient;
