use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    #[sea_orm(unique)]
    pub api_key: String,
    pub email_confirmed: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_sign_in_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::scouts::Entity")]
    Scouts,
    #[sea_orm(has_one = "super::user_preferences::Entity")]
    UserPreferences,
    #[sea_orm(has_many = "super::firecrawl_usage_logs::Entity")]
    FirecrawlUsageLogs,
}

impl Related<super::scouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scouts.def()
    }
}

impl Related<super::user_preferences::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPreferences.def()
    }
}

impl Related<super::firecrawl_usage_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FirecrawlUsageLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
