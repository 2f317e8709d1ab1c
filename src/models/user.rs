//! User entity model
//!
//! Accounts with a flat role string; authorization compares the role against
//! explicit allow-lists per operation, never a hierarchy.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login identity, unique across all organizations
    pub email: String,

    /// Salted one-way hash, never the plaintext password
    pub password_hash: String,

    /// org_admin | team_manager | employee | super_admin
    pub role: String,

    pub organization_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::team_member::Entity")]
    TeamMember,
    #[sea_orm(has_many = "super::user_assignment::Entity")]
    UserAssignment,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMember.def()
    }
}

impl Related<super::user_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
