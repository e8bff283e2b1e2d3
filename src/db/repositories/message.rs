use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::scout_messages;

pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn append(
        &self,
        scout_id: &str,
        role: &str,
        content: &str,
    ) -> Result<scout_messages::Model> {
        let model = scout_messages::ActiveModel {
            id: NotSet,
            scout_id: Set(scout_id.to_string()),
            role: Set(role.to_string()),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Ok(model.insert(&self.conn).await?)
    }

    /// Full conversation for a scout, oldest first.
    pub async fn list_for_scout(&self, scout_id: &str) -> Result<Vec<scout_messages::Model>> {
        Ok(scout_messages::Entity::find()
            .filter(scout_messages::Column::ScoutId.eq(scout_id))
            .order_by_asc(scout_messages::Column::Id)
            .all(&self.conn)
            .await?)
    }
}
