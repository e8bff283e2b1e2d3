//! Domain types for scout monitoring.
//!
//! The enums mirror the string-typed columns in the store.

pub mod events;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How often an active scout is scheduled by the external engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Hourly,
    #[serde(rename = "every_3_days")]
    Every3Days,
    Weekly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Every3Days => "every_3_days",
            Self::Weekly => "weekly",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Self::Hourly),
            "every_3_days" => Ok(Self::Every3Days),
            "weekly" => Ok(Self::Weekly),
            other => Err(format!("Unknown frequency: {other}")),
        }
    }
}

/// One atomic action within an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Search,
    Scrape,
    Analyze,
    Summarize,
    ToolCall,
}

impl StepType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Scrape => "scrape",
            Self::Analyze => "analyze",
            Self::Summarize => "summarize",
            Self::ToolCall => "tool_call",
        }
    }
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "scrape" => Ok(Self::Scrape),
            "analyze" => Ok(Self::Analyze),
            "summarize" => Ok(Self::Summarize),
            "tool_call" => Ok(Self::ToolCall),
            other => Err(format!("Unknown step type: {other}")),
        }
    }
}

/// Lifecycle status shared by executions and their steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("Unknown run status: {other}")),
        }
    }
}

/// State of a user's dedicated Firecrawl key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Pending,
    Active,
    Fallback,
    Failed,
    Invalid,
}

impl KeyStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
            Self::Invalid => "invalid",
        }
    }
}

impl FromStr for KeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "fallback" => Ok(Self::Fallback),
            "failed" => Ok(Self::Failed),
            "invalid" => Ok(Self::Invalid),
            other => Err(format!("Unknown key status: {other}")),
        }
    }
}

/// A normalized location attached to a scout or user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub country: String,
    pub country_code: String,
    pub state: Option<String>,
    pub state_code: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_string_forms() {
        assert_eq!(Frequency::Every3Days.as_str(), "every_3_days");
        assert_eq!(
            "every_3_days".parse::<Frequency>().unwrap(),
            Frequency::Every3Days
        );
        assert_eq!(
            serde_json::to_string(&Frequency::Every3Days).unwrap(),
            "\"every_3_days\""
        );
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn step_type_string_forms() {
        assert_eq!(StepType::ToolCall.as_str(), "tool_call");
        assert_eq!("tool_call".parse::<StepType>().unwrap(), StepType::ToolCall);
        assert_eq!(
            serde_json::to_string(&StepType::ToolCall).unwrap(),
            "\"tool_call\""
        );
    }

    #[test]
    fn key_status_round_trips() {
        for status in [
            KeyStatus::Pending,
            KeyStatus::Active,
            KeyStatus::Fallback,
            KeyStatus::Failed,
            KeyStatus::Invalid,
        ] {
            assert_eq!(status.as_str().parse::<KeyStatus>().unwrap(), status);
        }
    }
}
