//! # Team Repository
//!
//! Teams and team memberships. The membership pair is a composite primary
//! key; inserting the same pair twice is a duplicate validation failure.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::error::RepositoryError;
use crate::models::team::{self, Entity as Team};
use crate::models::team_member::{self, Entity as TeamMember};

/// Repository for team operations
pub struct TeamRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TeamRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        name: &str,
        organization_id: i32,
        manager_id: Option<i32>,
    ) -> Result<team::Model, RepositoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RepositoryError::validation("Team name cannot be empty"));
        }

        let model = team::ActiveModel {
            name: Set(trimmed.to_string()),
            organization_id: Set(organization_id),
            manager_id: Set(manager_id),
            ..Default::default()
        };

        Ok(model.insert(self.db).await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<team::Model>, RepositoryError> {
        Ok(Team::find_by_id(id).one(self.db).await?)
    }

    /// Records a user as a member of a team.
    pub async fn add_member(&self, team_id: i32, user_id: i32) -> Result<(), RepositoryError> {
        if self.find_by_id(team_id).await?.is_none() {
            return Err(RepositoryError::not_found("Team not found"));
        }

        let membership = team_member::ActiveModel {
            team_id: Set(team_id),
            user_id: Set(user_id),
        };

        membership
            .insert(self.db)
            .await
            .map_err(|e| RepositoryError::from_db("User is already a member of this team", e))?;
        Ok(())
    }

    /// Ids of the teams managed by the given user.
    pub async fn managed_team_ids(&self, user_id: i32) -> Result<Vec<i32>, RepositoryError> {
        let teams = Team::find()
            .filter(team::Column::ManagerId.eq(user_id))
            .all(self.db)
            .await?;
        Ok(teams.into_iter().map(|t| t.id).collect())
    }

    /// Ids of the teams the given user belongs to.
    pub async fn member_team_ids(&self, user_id: i32) -> Result<Vec<i32>, RepositoryError> {
        let memberships = TeamMember::find()
            .filter(team_member::Column::UserId.eq(user_id))
            .all(self.db)
            .await?;
        Ok(memberships.into_iter().map(|m| m.team_id).collect())
    }
}
