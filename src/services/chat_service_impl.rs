//! Chat service backed by the store and the external completion endpoint.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::types::MessageDto;
use crate::clients::ChatClient;
use crate::clients::chat::ChatMessage;
use crate::db::{ScoutUpdate, Store};
use crate::domain::Frequency;
use crate::entities::scouts;
use crate::services::chat_service::{
    ChatService, ChatServiceError, ScoutUpdatePayload, extract_scout_update,
};

const SYSTEM_PROMPT: &str = "You are helping a user configure a web monitoring scout. \
Gather a title, a goal, search queries, an optional location, and a run frequency \
(hourly, every_3_days or weekly). When you learn new values, include a fenced json \
block with {\"type\": \"scout_update\", ...} carrying only the changed fields.";

pub struct DefaultChatService {
    store: Arc<Store>,
    chat: Arc<ChatClient>,
}

impl DefaultChatService {
    #[must_use]
    pub const fn new(store: Arc<Store>, chat: Arc<ChatClient>) -> Self {
        Self { store, chat }
    }

    async fn owned_scout(
        &self,
        user_id: &str,
        scout_id: &str,
    ) -> Result<scouts::Model, ChatServiceError> {
        let scout = self
            .store
            .get_scout(scout_id)
            .await?
            .ok_or(ChatServiceError::NotOwner)?;
        if scout.user_id != user_id {
            return Err(ChatServiceError::NotOwner);
        }
        Ok(scout)
    }

    async fn apply_update(
        &self,
        scout_id: &str,
        payload: ScoutUpdatePayload,
    ) -> Result<(), ChatServiceError> {
        let frequency = match payload.frequency.as_deref() {
            Some(raw) => match Frequency::from_str(raw) {
                Ok(f) => Some(f),
                Err(e) => {
                    warn!("Assistant sent an unusable frequency: {e}");
                    None
                }
            },
            None => None,
        };

        let update = ScoutUpdate {
            title: payload.title,
            description: payload.description,
            goal: payload.goal,
            search_queries: payload.search_queries,
            location: payload.location,
            frequency,
        };

        if update.is_empty() {
            return Ok(());
        }

        self.store.update_scout(scout_id, update).await?;
        debug!("Applied assistant update to scout {scout_id}");
        Ok(())
    }
}

fn scout_context(scout: &scouts::Model) -> String {
    format!(
        "Current scout state: title={:?}, goal={:?}, search_queries={}, frequency={:?}.",
        scout.title,
        scout.goal,
        scout.search_queries.as_deref().unwrap_or("[]"),
        scout.frequency,
    )
}

#[async_trait::async_trait]
impl ChatService for DefaultChatService {
    async fn list_messages(
        &self,
        user_id: &str,
        scout_id: &str,
    ) -> Result<Vec<MessageDto>, ChatServiceError> {
        self.owned_scout(user_id, scout_id).await?;
        let messages = self.store.list_messages(scout_id).await?;
        Ok(messages.into_iter().map(MessageDto::from).collect())
    }

    async fn send_message(
        &self,
        user_id: &str,
        scout_id: &str,
        content: &str,
    ) -> Result<Vec<MessageDto>, ChatServiceError> {
        let scout = self.owned_scout(user_id, scout_id).await?;

        self.store.append_message(scout_id, "user", content).await?;

        let mut conversation = vec![
            ChatMessage::new("system", SYSTEM_PROMPT),
            ChatMessage::new("system", scout_context(&scout)),
        ];
        for message in self.store.list_messages(scout_id).await? {
            conversation.push(ChatMessage::new(&message.role, message.content));
        }

        let reply = self
            .chat
            .complete(&conversation)
            .await
            .map_err(|e| ChatServiceError::Backend(e.to_string()))?;

        let (cleaned, update) = extract_scout_update(&reply);
        if let Some(payload) = update {
            self.apply_update(scout_id, payload).await?;
        }

        self.store
            .append_message(scout_id, "assistant", &cleaned)
            .await?;

        let messages = self.store.list_messages(scout_id).await?;
        Ok(messages.into_iter().map(MessageDto::from).collect())
    }
}
