//! # User Repository
//!
//! Account lookup and creation. Email uniqueness is enforced by the store
//! and translated into a validation failure here.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::Role;
use crate::error::RepositoryError;
use crate::models::user::{ActiveModel, Column, Entity as User, Model};

/// Repository for user account operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with the given role.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
        organization_id: Option<i32>,
    ) -> Result<Model, RepositoryError> {
        let account = ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.as_str().to_string()),
            organization_id: Set(organization_id),
            ..Default::default()
        };

        account
            .insert(self.db)
            .await
            .map_err(|e| RepositoryError::from_db("A user with this email already exists", e))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Model>, RepositoryError> {
        Ok(User::find()
            .filter(Column::Email.eq(email))
            .one(self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Model>, RepositoryError> {
        Ok(User::find_by_id(id).one(self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_and_find_by_email() {
        let db = test_db().await;
        let repo = UserRepository::new(&db);

        let created = repo
            .create("a@example.com", "hash", Role::Employee, None)
            .await
            .unwrap();
        assert_eq!(created.role, "employee");

        let found = repo.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_validation_failure() {
        let db = test_db().await;
        let repo = UserRepository::new(&db);

        repo.create("a@example.com", "hash", Role::Employee, None)
            .await
            .unwrap();
        let err = repo
            .create("a@example.com", "hash2", Role::OrgAdmin, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }
}
