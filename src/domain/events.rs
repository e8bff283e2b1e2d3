//! Events sent to connected clients via SSE (Server-Sent Events).

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    ExecutionCreated {
        execution_id: String,
        scout_id: String,
    },
    ExecutionStatusChanged {
        execution_id: String,
        scout_id: String,
        status: String,
    },
    StepRecorded {
        execution_id: String,
        scout_id: String,
        step_number: i32,
        step_type: String,
    },
    KeyStatusChanged {
        user_id: String,
        status: String,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}

impl NotificationEvent {
    /// Scout the event belongs to, for per-scout SSE filtering. Events
    /// without one pass every filter.
    #[must_use]
    pub fn scout_id(&self) -> Option<&str> {
        match self {
            Self::ExecutionCreated { scout_id, .. }
            | Self::ExecutionStatusChanged { scout_id, .. }
            | Self::StepRecorded { scout_id, .. } => Some(scout_id),
            Self::KeyStatusChanged { .. } | Self::Error { .. } | Self::Info { .. } => None,
        }
    }
}
