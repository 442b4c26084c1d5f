use sea_orm::entity::prelude::*;

/// Append-only record of what the classifier said at submission time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "prediction_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub complaint_id: i64,

    pub predicted_priority: String,

    pub confidence_score: f64,

    pub model_version: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
