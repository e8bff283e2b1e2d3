pub mod execution;
pub mod message;
pub mod preferences;
pub mod scout;
pub mod usage;
pub mod user;

pub use execution::{ExecutionRepository, NewStep};
pub use message::MessageRepository;
pub use preferences::PreferencesRepository;
pub use scout::{NewScout, ScoutRepository, ScoutUpdate};
pub use usage::{UsageEvent, UsageRepository};
pub use user::{User, UserRepository};
