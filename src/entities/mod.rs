pub mod firecrawl_usage_logs;
pub mod scout_executions;
pub mod scout_execution_steps;
pub mod scout_messages;
pub mod scouts;
pub mod user_preferences;
pub mod users;

pub mod prelude {
    pub use super::firecrawl_usage_logs::Entity as FirecrawlUsageLogs;
    pub use super::scout_execution_steps::Entity as ScoutExecutionSteps;
    pub use super::scout_executions::Entity as ScoutExecutions;
    pub use super::scout_messages::Entity as ScoutMessages;
    pub use super::scouts::Entity as Scouts;
    pub use super::user_preferences::Entity as UserPreferences;
    pub use super::users::Entity as Users;
}
