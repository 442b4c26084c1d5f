use sea_orm::entity::prelude::*;

/// One row per user: a fresh login replaces any prior session for the
/// same account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,

    /// Opaque 64-char hex token handed to the client
    #[sea_orm(unique)]
    pub token: String,

    pub expires_at: String,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
