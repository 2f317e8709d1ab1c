//! # Employee Directory Repository

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::error::RepositoryError;
use crate::models::employee::{ActiveModel, Column, Entity as Employee, Model};

/// Fields accepted when creating a directory row.
#[derive(Debug, Clone, Default)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<i32>,
}

/// Repository for the employee directory
pub struct EmployeeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EmployeeRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: NewEmployee) -> Result<Model, RepositoryError> {
        if input.first_name.trim().is_empty() {
            return Err(RepositoryError::validation("First name is required"));
        }

        let row = ActiveModel {
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name),
            email: Set(input.email),
            position: Set(input.position),
            department: Set(input.department),
            phone: Set(input.phone),
            user_id: Set(input.user_id),
            ..Default::default()
        };

        row.insert(self.db)
            .await
            .map_err(|e| RepositoryError::from_db("An employee with this email already exists", e))
    }

    pub async fn list(&self) -> Result<Vec<Model>, RepositoryError> {
        Ok(Employee::find()
            .order_by_asc(Column::Id)
            .all(self.db)
            .await?)
    }
}
