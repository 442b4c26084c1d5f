use sea_orm::entity::prelude::*;

/// Append-only: one row per status transition.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub complaint_id: i64,

    /// Null only on a seeded initial entry; transitions always record the
    /// prior status ("Registered" when no history existed yet).
    pub old_status: Option<String>,

    pub new_status: String,

    pub admin_id: i32,

    pub notes: Option<String>,

    pub changed_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::complaints::Entity",
        from = "Column::ComplaintId",
        to = "super::complaints::Column::Id"
    )]
    Complaint,
}

impl Related<super::complaints::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
