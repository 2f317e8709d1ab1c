//! # Organization Repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::error::RepositoryError;
use crate::models::organization::{ActiveModel, Entity as Organization, Model};

/// Repository for organization operations
pub struct OrganizationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an organization; the name is unique across the system.
    pub async fn create(&self, name: &str) -> Result<Model, RepositoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RepositoryError::validation(
                "Organization name cannot be empty",
            ));
        }

        let org = ActiveModel {
            name: Set(trimmed.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };

        org.insert(self.db).await.map_err(|e| {
            RepositoryError::from_db("An organization with this name already exists", e)
        })
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Model>, RepositoryError> {
        Ok(Organization::find_by_id(id).one(self.db).await?)
    }
}
