//! Assignment entity model
//!
//! is_general is written by the lifecycle paths and must stay consistent with
//! team_id and the user_assignments join table: true iff neither selector is
//! set. Non-general assignments are visible when EITHER selector matches.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: Option<String>,

    /// Opaque date string, passed through unchanged on the wire
    pub due_date: Option<String>,

    /// Derived: no team selector and no individual targets
    pub is_general: bool,

    pub team_id: Option<i32>,

    pub created_by_id: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedById",
        to = "super::user::Column::Id"
    )]
    CreatedBy,
    #[sea_orm(has_many = "super::user_assignment::Entity")]
    UserAssignment,
    #[sea_orm(has_many = "super::submission::Entity")]
    Submission,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedBy.def()
    }
}

impl Related<super::user_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAssignment.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
